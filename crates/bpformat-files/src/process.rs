use crate::launch::ProcessEntry;
use serde::{Deserialize, Serialize};

/// Command entries exactly as declared, before any shell or argument handling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawCommand {
    entries: Vec<String>,
}

impl RawCommand {
    pub fn new(entries: Vec<String>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A process ready to be recorded for the launcher. Execution is the caller's concern.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchProcess {
    pub r#type: String,
    pub command: RawCommand,
    #[serde(default)]
    pub args: Vec<String>,
    pub direct: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub default: bool,
    #[serde(rename = "buildpack-id")]
    pub buildpack_id: String,
    #[serde(
        rename = "working-dir",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub working_directory: String,
}

impl ProcessEntry {
    /// Attribute this process to `buildpack_id`.
    ///
    /// Legacy entries always carry `direct` after decoding. Entries without it
    /// come from API >= 0.9, where every process is direct.
    pub fn to_launch_process(&self, buildpack_id: &str) -> LaunchProcess {
        LaunchProcess {
            r#type: self.r#type.clone(),
            command: RawCommand::new(self.command.clone()),
            args: self.args.clone(),
            direct: self.direct.unwrap_or(true),
            default: self.default,
            buildpack_id: buildpack_id.to_owned(),
            working_directory: self.working_directory.clone(),
        }
    }
}
