//! `build.toml`: what a build step provided and which plan entries it left unmet.

use crate::require::BomEntry;
use crate::toml_file::decode_file;
use crate::FormatError;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildDescriptor {
    #[serde(default)]
    pub bom: Vec<BomEntry>,
    #[serde(default)]
    pub unmet: Vec<Unmet>,
}

/// A buildpack plan entry the buildpack declined to satisfy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unmet {
    #[serde(default)]
    pub name: String,
}

impl Unmet {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Read `build.toml`. The file is required; a missing file is an error.
pub fn decode_build_descriptor(path: impl AsRef<Path>) -> Result<BuildDescriptor, FormatError> {
    decode_file(path)
}
