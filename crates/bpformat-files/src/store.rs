//! `store.toml`: buildpack-owned metadata persisted between builds.

use crate::toml_file::{decode_file, encode_file};
use crate::FormatError;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreDescriptor {
    #[serde(rename = "metadata", default)]
    pub data: toml::Table,
}

/// Read `store.toml`. A missing file is an error.
pub fn decode_store(path: impl AsRef<Path>) -> Result<StoreDescriptor, FormatError> {
    decode_file(path)
}

pub fn encode_store(path: impl AsRef<Path>, store: &StoreDescriptor) -> Result<(), FormatError> {
    encode_file(path, store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.toml");
        let mut store = StoreDescriptor::default();
        store
            .data
            .insert("cache-key".to_owned(), toml::Value::String("abc".to_owned()));
        store.data.insert("runs".to_owned(), toml::Value::Integer(3));

        encode_store(&path, &store).unwrap();
        let loaded = decode_store(&path).unwrap();
        assert_eq!(loaded, store);
    }

    #[test]
    fn store_without_metadata_decodes_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.toml");
        std::fs::write(&path, "").unwrap();
        assert!(decode_store(&path).unwrap().data.is_empty());
    }

    #[test]
    fn missing_store_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(decode_store(dir.path().join("store.toml"))
            .unwrap_err()
            .is_not_found());
    }
}
