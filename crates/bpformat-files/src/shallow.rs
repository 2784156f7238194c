//! Shallow top-level key checks used to flag fields placed for the wrong API version.
//!
//! Not a schema validator: it decodes the document once
//! into an untyped table and only looks at the names of its top-level keys.

use crate::toml_file::decode_str;
use crate::FormatError;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A tolerated schema placement problem, reported next to a successfully decoded value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaAdvisory {
    /// `build`, `launch` or `cache` found at the top level of a file that
    /// expects them in a `types` table.
    FlagsOutsideTypesTable { path: PathBuf },
    /// A `types` table found in a file whose API keeps the flags at the top
    /// level. Its contents are discarded.
    TypesTableIgnored,
}

impl fmt::Display for SchemaAdvisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaAdvisory::FlagsOutsideTypesTable { path } => write!(
                f,
                "the launch, cache and build flags should be in the types table of {}",
                path.display()
            ),
            SchemaAdvisory::TypesTableIgnored => f.write_str(
                "Types table isn't supported in this buildpack api version. \
                 The launch, build and cache flags should be in the top level. \
                 Ignoring the values in the types table.",
            ),
        }
    }
}

/// Report whether any of `forbidden` appears as a top-level key of `content`.
pub fn top_level_keys_present(
    content: &str,
    path: &Path,
    forbidden: &[&str],
) -> Result<bool, FormatError> {
    let table: toml::Table = decode_str(content, path)?;
    let found: Vec<&str> = forbidden
        .iter()
        .copied()
        .filter(|key| table.contains_key(*key))
        .collect();
    if !found.is_empty() {
        debug!("{}: unexpected top-level keys {found:?}", path.display());
    }
    Ok(!found.is_empty())
}
