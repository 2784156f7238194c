//! Buildpack plans and build plans.
//!
//! A [`Plan`] is what a single buildpack was asked to provide (`entries`). A
//! [`BuildPlan`] is what a buildpack declared during detection: its own
//! `requires`/`provides` plus mutually exclusive `or` alternatives.

use crate::build::Unmet;
use crate::require::{BomEntry, Require, VersionChecks};
use crate::toml_file::{decode_file, encode_file};
use crate::FormatError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A buildpack-local plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default)]
    pub entries: Vec<Require>,
}

impl Plan {
    /// Entries whose name is not in `unmet`, in their original order.
    #[must_use]
    pub fn filter(&self, unmet: &[Unmet]) -> Plan {
        let entries = self
            .entries
            .iter()
            .filter(|entry| !unmet.iter().any(|u| u.name == entry.name))
            .cloned()
            .collect();
        Plan { entries }
    }

    /// Every entry as a BOM entry with no buildpack identity, in order.
    pub fn to_bom(&self) -> Vec<BomEntry> {
        self.entries.iter().cloned().map(BomEntry::from).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provide {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanSections {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<Require>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub provides: Vec<Provide>,
}

impl PlanSections {
    pub fn has_requires(&self) -> bool {
        !self.requires.is_empty()
    }
}

impl VersionChecks for PlanSections {
    fn has_doubly_specified_versions(&self) -> bool {
        self.requires.has_doubly_specified_versions()
    }

    fn has_inconsistent_versions(&self) -> bool {
        self.requires.has_inconsistent_versions()
    }

    fn has_top_level_versions(&self) -> bool {
        self.requires.has_top_level_versions()
    }
}

/// Sections declared at detect time, with `or` alternatives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildPlan {
    #[serde(flatten)]
    pub sections: PlanSections,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub or: Vec<PlanSections>,
}

impl BuildPlan {
    /// True if the primary sections or any alternative has a requirement.
    pub fn has_requires(&self) -> bool {
        self.sections.has_requires() || self.or.iter().any(PlanSections::has_requires)
    }
}

impl VersionChecks for BuildPlan {
    fn has_doubly_specified_versions(&self) -> bool {
        self.sections.has_doubly_specified_versions() || self.or.has_doubly_specified_versions()
    }

    fn has_inconsistent_versions(&self) -> bool {
        self.sections.has_inconsistent_versions() || self.or.has_inconsistent_versions()
    }

    fn has_top_level_versions(&self) -> bool {
        self.sections.has_top_level_versions() || self.or.has_top_level_versions()
    }
}

/// Read a buildpack plan (`entries = [...]`).
pub fn decode_plan(path: impl AsRef<Path>) -> Result<Plan, FormatError> {
    decode_file(path)
}

pub fn encode_plan(path: impl AsRef<Path>, plan: &Plan) -> Result<(), FormatError> {
    encode_file(path, plan)
}

/// Read a build plan (`requires`, `provides`, `or`).
pub fn decode_build_plan(path: impl AsRef<Path>) -> Result<BuildPlan, FormatError> {
    decode_file(path)
}
