//! Versioned codecs for the data-format files exchanged between buildpack lifecycle phases.
//!
//! Each file kind is decoded against a declared buildpack API version
//! ([`ApiVersion`]). Where the on-disk shape changed between API revisions the
//! codec picks one of exactly two layouts: layer metadata flags moved into a
//! `types` table at 0.6 ([`layer_metadata`]), and process commands became
//! string lists at 0.9 ([`launch`]). Fields found in the wrong place are
//! reported as non-fatal [`SchemaAdvisory`] values rather than errors.
//!
//! Requirement version reconciliation lives in [`require`], buildpack plan
//! filtering in [`plan`], and the remaining fixed-shape files in [`build`],
//! [`store`] and [`layers`].

pub mod build;
pub mod launch;
pub mod layer_metadata;
pub mod layers;
pub mod plan;
pub mod process;
pub mod require;
pub mod shallow;
pub mod store;
pub mod toml_file;

pub use bpformat_api::{ApiError, ApiVersion};
pub use build::{decode_build_descriptor, BuildDescriptor, Unmet};
pub use launch::{decode_launch_descriptor, Label, LaunchDescriptor, ProcessEntry, Slice};
pub use layer_metadata::{
    decode_layer_metadata, encode_layer_metadata, Decoded, LayerDecodeError, LayerMetadataFile,
};
pub use layers::{LayerMetadata, LayersMetadata};
pub use plan::{
    decode_build_plan, decode_plan, encode_plan, BuildPlan, Plan, PlanSections, Provide,
};
pub use process::{LaunchProcess, RawCommand};
pub use require::{BomEntry, BuildpackIdentity, Require, VersionChecks};
pub use shallow::{top_level_keys_present, SchemaAdvisory};
pub use store::{decode_store, encode_store, StoreDescriptor};
pub use toml_file::{decode_file, decode_str, encode_file};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{message}\nerror occurred at line {line} column {column}")]
    Syntax {
        path: PathBuf,
        message: String,
        line: usize,
        column: usize,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to serialize TOML: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid buildpack API: {0}")]
    Api(#[from] ApiError),
    #[error("couldn't find a codec for buildpack API {api}")]
    NoCodec { api: ApiVersion },
    #[error("{key} is not supported on this buildpack version")]
    UnsupportedKey { key: String, api: ApiVersion },
}

impl FormatError {
    /// True when the underlying file does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, FormatError::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }

    /// 1-based `(line, column)` of a syntax error, if this is one.
    pub fn position(&self) -> Option<(usize, usize)> {
        match self {
            FormatError::Syntax { line, column, .. } => Some((*line, *column)),
            _ => None,
        }
    }
}
