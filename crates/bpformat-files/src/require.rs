//! Requirements, bill-of-materials entries, and version reconciliation.
//!
//! A requirement's version can be declared either as the top-level `version`
//! field or as `metadata.version`. Newer buildpack APIs prefer the metadata
//! form. The conversions here move a version between the two places, and the
//! [`VersionChecks`] predicates let callers decide whether a file that uses
//! both, or the old form, should be rejected.

use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};

const VERSION_KEY: &str = "version";

/// A named requirement (or provision) with optional version and free-form metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Require {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(default, skip_serializing_if = "toml::Table::is_empty")]
    pub metadata: toml::Table,
}

impl Require {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<toml::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// `metadata.version` rendered as plain text, if present.
    pub fn metadata_version(&self) -> Option<String> {
        self.metadata.get(VERSION_KEY).map(plain_text)
    }

    /// Copy `metadata.version` into `version`. The metadata entry is kept.
    pub fn convert_metadata_to_version(&mut self) {
        if let Some(version) = self.metadata_version() {
            self.version = version;
        }
    }

    /// Move a non-empty `version` into `metadata.version`.
    pub fn convert_version_to_metadata(&mut self) {
        if !self.version.is_empty() {
            let version = std::mem::take(&mut self.version);
            self.metadata
                .insert(VERSION_KEY.to_owned(), toml::Value::String(version));
        }
    }
}

/// Strings are taken verbatim; other values use their TOML rendering.
fn plain_text(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Existential version-placement predicates.
///
/// Implemented for a single [`Require`] and lifted to any collection of
/// implementors: a collection satisfies a predicate when any element does.
pub trait VersionChecks {
    /// Both `version` and `metadata.version` are set, whether or not they agree.
    fn has_doubly_specified_versions(&self) -> bool;

    /// Both are set and their text differs.
    fn has_inconsistent_versions(&self) -> bool;

    /// `version` is set.
    fn has_top_level_versions(&self) -> bool;
}

impl VersionChecks for Require {
    fn has_doubly_specified_versions(&self) -> bool {
        self.metadata.contains_key(VERSION_KEY) && !self.version.is_empty()
    }

    fn has_inconsistent_versions(&self) -> bool {
        match self.metadata_version() {
            Some(metadata_version) => {
                !self.version.is_empty() && self.version != metadata_version
            }
            None => false,
        }
    }

    fn has_top_level_versions(&self) -> bool {
        !self.version.is_empty()
    }
}

impl<T: VersionChecks> VersionChecks for [T] {
    fn has_doubly_specified_versions(&self) -> bool {
        self.iter().any(VersionChecks::has_doubly_specified_versions)
    }

    fn has_inconsistent_versions(&self) -> bool {
        self.iter().any(VersionChecks::has_inconsistent_versions)
    }

    fn has_top_level_versions(&self) -> bool {
        self.iter().any(VersionChecks::has_top_level_versions)
    }
}

/// Identity of the buildpack that contributed a BOM entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildpackIdentity {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub version: String,
}

impl BuildpackIdentity {
    pub fn new(id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_empty() && self.version.is_empty()
    }
}

/// A bill-of-materials entry: a requirement plus the buildpack that reported it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BomEntry {
    #[serde(flatten)]
    pub require: Require,
    #[serde(default)]
    pub buildpack: BuildpackIdentity,
}

impl BomEntry {
    pub fn convert_metadata_to_version(&mut self) {
        self.require.convert_metadata_to_version();
    }

    pub fn convert_version_to_metadata(&mut self) {
        self.require.convert_version_to_metadata();
    }
}

impl From<Require> for BomEntry {
    fn from(require: Require) -> Self {
        Self {
            require,
            buildpack: BuildpackIdentity::default(),
        }
    }
}

impl Deref for BomEntry {
    type Target = Require;

    fn deref(&self) -> &Require {
        &self.require
    }
}

impl DerefMut for BomEntry {
    fn deref_mut(&mut self) -> &mut Require {
        &mut self.require
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_to_version_copies_and_keeps_entry() {
        let mut r = Require::new("node").with_metadata("version", "18.1");
        r.convert_metadata_to_version();
        assert_eq!(r.version, "18.1");
        assert_eq!(
            r.metadata.get("version").and_then(toml::Value::as_str),
            Some("18.1")
        );
    }

    #[test]
    fn metadata_to_version_stringifies_numbers() {
        let mut r = Require::new("ruby").with_metadata("version", 3);
        r.convert_metadata_to_version();
        assert_eq!(r.version, "3");

        let mut r = Require::new("go").with_metadata("version", 1.5);
        r.convert_metadata_to_version();
        assert_eq!(r.version, "1.5");
    }

    #[test]
    fn metadata_to_version_without_metadata_is_noop() {
        let mut r = Require::new("node").with_version("16");
        r.convert_metadata_to_version();
        assert_eq!(r.version, "16");
    }

    #[test]
    fn version_to_metadata_moves_value() {
        let mut r = Require::new("node").with_version("18.1");
        r.convert_version_to_metadata();
        assert!(r.version.is_empty());
        assert_eq!(r.metadata_version().as_deref(), Some("18.1"));
    }

    #[test]
    fn version_to_metadata_overwrites_and_keeps_other_keys() {
        let mut r = Require::new("node")
            .with_version("2.0")
            .with_metadata("version", "1.0")
            .with_metadata("launch", true);
        r.convert_version_to_metadata();
        assert_eq!(r.metadata_version().as_deref(), Some("2.0"));
        assert_eq!(r.metadata.get("launch"), Some(&toml::Value::Boolean(true)));
    }

    #[test]
    fn empty_version_is_not_moved() {
        let mut r = Require::new("node");
        r.convert_version_to_metadata();
        assert!(r.metadata.is_empty());
    }

    #[test]
    fn doubly_specified_ignores_equality() {
        let same = Require::new("a")
            .with_version("1.0")
            .with_metadata("version", "1.0");
        let different = Require::new("a")
            .with_version("1.0")
            .with_metadata("version", "2.0");
        assert!(same.has_doubly_specified_versions());
        assert!(different.has_doubly_specified_versions());
        assert!(!Require::new("a").with_version("1.0").has_doubly_specified_versions());
        assert!(!Require::new("a")
            .with_metadata("version", "1.0")
            .has_doubly_specified_versions());
    }

    #[test]
    fn inconsistent_only_when_text_differs() {
        let different = Require::new("a")
            .with_version("1.0")
            .with_metadata("version", "2.0");
        let same = Require::new("a")
            .with_version("1.0")
            .with_metadata("version", "1.0");
        assert!(different.has_inconsistent_versions());
        assert!(!same.has_inconsistent_versions());
        assert!(!Require::new("a")
            .with_metadata("version", "2.0")
            .has_inconsistent_versions());
    }

    #[test]
    fn top_level_version_check() {
        assert!(Require::new("a").with_version("1").has_top_level_versions());
        assert!(!Require::new("a")
            .with_metadata("version", "1")
            .has_top_level_versions());
    }

    #[test]
    fn predicates_lift_over_slices() {
        let list = vec![
            Require::new("a"),
            Require::new("b")
                .with_version("1.0")
                .with_metadata("version", "2.0"),
        ];
        assert!(list.has_inconsistent_versions());
        assert!(list.has_doubly_specified_versions());
        assert!(list.has_top_level_versions());

        let clean = vec![Require::new("a").with_metadata("version", "1.0")];
        assert!(!clean.has_inconsistent_versions());
        assert!(!clean.has_doubly_specified_versions());
        assert!(!clean.has_top_level_versions());

        let empty: Vec<Require> = Vec::new();
        assert!(!empty.has_top_level_versions());
    }

    #[test]
    fn bom_entry_flattens_require() {
        let entry = BomEntry {
            require: Require::new("node").with_metadata("version", "18"),
            buildpack: BuildpackIdentity::new("bp/node", "0.1.0"),
        };
        let text = toml::to_string(&entry).unwrap();
        let table: toml::Table = toml::from_str(&text).unwrap();
        assert_eq!(table.get("name").and_then(toml::Value::as_str), Some("node"));
        assert!(table.contains_key("metadata"));
        assert!(table.contains_key("buildpack"));

        let back: BomEntry = toml::from_str(&text).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn bom_entry_conversions_delegate() {
        let mut entry = BomEntry::from(Require::new("node").with_version("18"));
        assert!(entry.buildpack.is_empty());
        entry.convert_version_to_metadata();
        assert!(entry.version.is_empty());
        assert_eq!(entry.metadata_version().as_deref(), Some("18"));
        entry.convert_metadata_to_version();
        assert_eq!(entry.name, "node");
        assert_eq!(entry.version, "18");
    }
}
