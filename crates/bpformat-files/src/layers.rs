//! Layers metadata: the JSON document describing every layer a build exported.

use crate::layer_metadata::LayerMetadataFile;
use crate::store::StoreDescriptor;
use crate::FormatError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayersMetadata {
    #[serde(rename = "key", default)]
    pub id: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub layers: BTreeMap<String, LayerMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<StoreDescriptor>,
}

/// A layer's metadata file contents plus the digest of its exported content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerMetadata {
    #[serde(default)]
    pub sha: String,
    #[serde(flatten)]
    pub file: LayerMetadataFile,
}

impl LayersMetadata {
    /// Parse the label JSON.
    ///
    /// Layer `data` must be representable as TOML: a `null` nested inside it
    /// is rejected, while `"data": null` itself means no data.
    pub fn from_json(input: &str) -> Result<Self, FormatError> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn to_json(&self) -> Result<String, FormatError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn layer(&self, name: &str) -> Option<&LayerMetadata> {
        self.layers.get(name)
    }
}
