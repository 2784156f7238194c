//! `launch.toml`: processes, labels, slices and BOM contributed for the launch image.
//!
//! Before buildpack API 0.9 a process `command` is a single string and
//! `direct` defaults to `false`. From 0.9 on `command` is a list of strings
//! and `direct` is no longer accepted: processes are always direct.

use crate::process::LaunchProcess;
use crate::require::BomEntry;
use crate::toml_file::decode_str;
use crate::FormatError;
use bpformat_api::{ApiVersion, PROCESS_COMMAND_LIST};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LaunchDescriptor {
    #[serde(default)]
    pub bom: Vec<BomEntry>,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub processes: Vec<ProcessEntry>,
    #[serde(default)]
    pub slices: Vec<Slice>,
}

impl LaunchDescriptor {
    /// Convert every process, in order, attributing it to `buildpack_id`.
    pub fn to_launch_processes(&self, buildpack_id: &str) -> Vec<LaunchProcess> {
        self.processes
            .iter()
            .map(|process| process.to_launch_process(buildpack_id))
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
}

/// A group of application paths exported as their own layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slice {
    #[serde(default)]
    pub paths: Vec<String>,
}

/// A process as declared in `launch.toml`.
///
/// `raw_command_value` is what the file said; `command` is the resolved form
/// filled in after decoding and is never read from the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessEntry {
    #[serde(default)]
    pub r#type: String,
    #[serde(skip)]
    pub command: Vec<String>,
    #[serde(rename = "command", default)]
    pub raw_command_value: Vec<String>,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direct: Option<bool>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub default: bool,
    #[serde(
        rename = "working-dir",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub working_directory: String,
}

/// Pre-0.9 layout, only ever read.
#[derive(Deserialize)]
struct StringCommandDescriptor {
    #[serde(default)]
    bom: Vec<BomEntry>,
    #[serde(default)]
    labels: Vec<Label>,
    #[serde(default)]
    processes: Vec<StringCommandProcess>,
    #[serde(default)]
    slices: Vec<Slice>,
}

#[derive(Deserialize)]
struct StringCommandProcess {
    #[serde(default)]
    r#type: String,
    #[serde(rename = "command", default)]
    raw_command_value: String,
    #[serde(default)]
    args: Vec<String>,
    #[serde(default)]
    direct: Option<bool>,
    #[serde(default)]
    default: bool,
    #[serde(rename = "working-dir", default)]
    working_directory: String,
}

impl From<StringCommandProcess> for ProcessEntry {
    fn from(process: StringCommandProcess) -> Self {
        let raw_command_value = if process.raw_command_value.is_empty() {
            Vec::new()
        } else {
            vec![process.raw_command_value]
        };
        ProcessEntry {
            r#type: process.r#type,
            command: Vec::new(),
            raw_command_value,
            args: process.args,
            direct: process.direct,
            default: process.default,
            working_directory: process.working_directory,
        }
    }
}

impl From<StringCommandDescriptor> for LaunchDescriptor {
    fn from(descriptor: StringCommandDescriptor) -> Self {
        LaunchDescriptor {
            bom: descriptor.bom,
            labels: descriptor.labels,
            processes: descriptor
                .processes
                .into_iter()
                .map(ProcessEntry::from)
                .collect(),
            slices: descriptor.slices,
        }
    }
}

/// Read `launch.toml` in the layout of buildpack API `api`.
///
/// The file is required; a missing file is an error. A `direct` key under
/// API >= 0.9 fails the whole decode.
pub fn decode_launch_descriptor(
    path: impl AsRef<Path>,
    api: &ApiVersion,
) -> Result<LaunchDescriptor, FormatError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;

    let commands_are_strings = api.less_than(&PROCESS_COMMAND_LIST);
    debug!(
        "decoding {} with {} commands for buildpack API {api}",
        path.display(),
        if commands_are_strings { "string" } else { "list" }
    );

    let mut descriptor: LaunchDescriptor = if commands_are_strings {
        decode_str::<StringCommandDescriptor>(&content, path)?.into()
    } else {
        decode_str(&content, path)?
    };

    for process in &mut descriptor.processes {
        if commands_are_strings {
            process.direct.get_or_insert(false);
        } else if process.direct.is_some() {
            return Err(FormatError::UnsupportedKey {
                key: "process.direct".to_owned(),
                api: *api,
            });
        }
        process.command = process.raw_command_value.clone();
    }

    Ok(descriptor)
}
