//! Layer metadata files (`<layers>/<buildpack>/<layer>.toml`).
//!
//! Two on-disk shapes exist, selected by buildpack API:
//!
//! - API >= 0.6: data under `metadata`, flags under a `types` table. Encoding
//!   writes only `metadata`; the flags are never written back.
//! - API < 0.6: data under `metadata`, flags `build`, `launch`, `cache` at the
//!   top level.
//!
//! A missing file decodes to an empty value. Flags found in the other API's
//! place are reported as a [`SchemaAdvisory`] instead of failing the read.

use crate::shallow::{top_level_keys_present, SchemaAdvisory};
use crate::toml_file::{decode_str, write_atomic};
use crate::FormatError;
use bpformat_api::{ApiVersion, LAYER_TYPES_TABLE};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Decoded contents of a layer metadata file.
///
/// Serializes with the `data` field name used by the layers metadata label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerMetadataFile {
    #[serde(default, alias = "metadata", skip_serializing_if = "Option::is_none")]
    pub data: Option<toml::Value>,
    #[serde(default)]
    pub build: bool,
    #[serde(default)]
    pub launch: bool,
    #[serde(default)]
    pub cache: bool,
}

/// A decoded value together with any tolerated schema problem.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Decoded<T> {
    pub value: T,
    pub advisory: Option<SchemaAdvisory>,
}

/// A failed layer metadata decode. An advisory computed before the failure is kept.
#[derive(Debug, Error)]
#[error("{source}")]
pub struct LayerDecodeError {
    pub advisory: Option<SchemaAdvisory>,
    #[source]
    pub source: FormatError,
}

impl From<FormatError> for LayerDecodeError {
    fn from(source: FormatError) -> Self {
        Self {
            advisory: None,
            source,
        }
    }
}

/// One on-disk layout of the layer metadata file.
trait LayerMetadataCodec: Sync {
    fn name(&self) -> &'static str;

    fn is_supported(&self, api: &ApiVersion) -> bool;

    fn encode(&self, file: &LayerMetadataFile) -> Result<String, FormatError>;

    fn decode(
        &self,
        content: &str,
        path: &Path,
    ) -> Result<Decoded<LayerMetadataFile>, LayerDecodeError>;
}

static CODECS: [&dyn LayerMetadataCodec; 2] = [&TypesTableCodec, &TopLevelCodec];

fn select_codec(api: &ApiVersion) -> Result<&'static dyn LayerMetadataCodec, FormatError> {
    let codec = CODECS
        .iter()
        .copied()
        .find(|codec| codec.is_supported(api))
        .ok_or(FormatError::NoCodec { api: *api })?;
    debug!("layer metadata codec '{}' for buildpack API {api}", codec.name());
    Ok(codec)
}

/// Write `file` to `path` in the layout of buildpack API `api`.
pub fn encode_layer_metadata(
    path: impl AsRef<Path>,
    file: &LayerMetadataFile,
    api: &ApiVersion,
) -> Result<(), FormatError> {
    let codec = select_codec(api)?;
    let content = codec.encode(file)?;
    write_atomic(path.as_ref(), content.as_bytes())
}

/// Read the layer metadata file at `path` in the layout of buildpack API `api`.
///
/// A missing file is not an error and yields [`LayerMetadataFile::default`].
pub fn decode_layer_metadata(
    path: impl AsRef<Path>,
    api: &ApiVersion,
) -> Result<Decoded<LayerMetadataFile>, LayerDecodeError> {
    let path = path.as_ref();
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("no layer metadata at {}", path.display());
            return Ok(Decoded::default());
        }
        Err(e) => return Err(FormatError::Io(e).into()),
    };
    select_codec(api)?.decode(&content, path)
}

/// API >= 0.6: flags live under `[types]` and are never written.
struct TypesTableCodec;

#[derive(Serialize)]
struct DataOnly<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<&'a toml::Value>,
}

#[derive(Default, Deserialize)]
struct TypesTable {
    #[serde(default)]
    build: bool,
    #[serde(default)]
    launch: bool,
    #[serde(default)]
    cache: bool,
}

#[derive(Deserialize)]
struct TypesTableLayout {
    #[serde(default)]
    metadata: Option<toml::Value>,
    #[serde(default)]
    types: TypesTable,
}

impl LayerMetadataCodec for TypesTableCodec {
    fn name(&self) -> &'static str {
        "types-table"
    }

    fn is_supported(&self, api: &ApiVersion) -> bool {
        api.at_least(&LAYER_TYPES_TABLE)
    }

    fn encode(&self, file: &LayerMetadataFile) -> Result<String, FormatError> {
        let data = DataOnly {
            metadata: file.data.as_ref(),
        };
        Ok(toml::to_string_pretty(&data)?)
    }

    fn decode(
        &self,
        content: &str,
        path: &Path,
    ) -> Result<Decoded<LayerMetadataFile>, LayerDecodeError> {
        let advisory = top_level_keys_present(content, path, &["build", "launch", "cache"])?
            .then(|| SchemaAdvisory::FlagsOutsideTypesTable {
                path: path.to_path_buf(),
            });

        let layout: TypesTableLayout =
            decode_str(content, path).map_err(|source| LayerDecodeError {
                advisory: advisory.clone(),
                source,
            })?;

        Ok(Decoded {
            value: LayerMetadataFile {
                data: layout.metadata,
                build: layout.types.build,
                launch: layout.types.launch,
                cache: layout.types.cache,
            },
            advisory,
        })
    }
}

/// API < 0.6: flags sit next to `metadata` at the top level.
struct TopLevelCodec;

#[derive(Serialize, Deserialize)]
struct TopLevelLayout {
    #[serde(default)]
    build: bool,
    #[serde(default)]
    launch: bool,
    #[serde(default)]
    cache: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    metadata: Option<toml::Value>,
}

impl LayerMetadataCodec for TopLevelCodec {
    fn name(&self) -> &'static str {
        "top-level"
    }

    fn is_supported(&self, api: &ApiVersion) -> bool {
        api.less_than(&LAYER_TYPES_TABLE)
    }

    fn encode(&self, file: &LayerMetadataFile) -> Result<String, FormatError> {
        let layout = TopLevelLayout {
            build: file.build,
            launch: file.launch,
            cache: file.cache,
            metadata: file.data.clone(),
        };
        Ok(toml::to_string_pretty(&layout)?)
    }

    fn decode(
        &self,
        content: &str,
        path: &Path,
    ) -> Result<Decoded<LayerMetadataFile>, LayerDecodeError> {
        let advisory = top_level_keys_present(content, path, &["types"])?
            .then_some(SchemaAdvisory::TypesTableIgnored);

        // Unknown keys, including `types`, are dropped by the typed decode.
        let layout: TopLevelLayout =
            decode_str(content, path).map_err(|source| LayerDecodeError {
                advisory: advisory.clone(),
                source,
            })?;

        Ok(Decoded {
            value: LayerMetadataFile {
                data: layout.metadata,
                build: layout.build,
                launch: layout.launch,
                cache: layout.cache,
            },
            advisory,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> ApiVersion {
        ApiVersion::parse(s).unwrap()
    }

    fn sample_data() -> toml::Value {
        toml::Value::Table(
            toml::from_str::<toml::Table>("version = \"18.1\"\n[nested]\nsha = \"abc\"\n").unwrap(),
        )
    }

    #[test]
    fn codec_selection_partitions_versions() {
        assert_eq!(select_codec(&v("0.5")).unwrap().name(), "top-level");
        assert_eq!(select_codec(&v("0.6")).unwrap().name(), "types-table");
        assert_eq!(select_codec(&v("0.9")).unwrap().name(), "types-table");
        assert_eq!(select_codec(&v("0.2")).unwrap().name(), "top-level");
    }

    #[test]
    fn types_table_encode_omits_flags() {
        let file = LayerMetadataFile {
            data: Some(sample_data()),
            build: true,
            launch: true,
            cache: true,
        };
        let text = TypesTableCodec.encode(&file).unwrap();
        let table: toml::Table = toml::from_str(&text).unwrap();
        assert!(table.contains_key("metadata"));
        assert!(!table.contains_key("types"));
        assert!(!table.contains_key("build"));
        assert!(!table.contains_key("launch"));
        assert!(!table.contains_key("cache"));
    }

    #[test]
    fn top_level_encode_writes_flags() {
        let file = LayerMetadataFile {
            data: None,
            build: true,
            launch: false,
            cache: true,
        };
        let text = TopLevelCodec.encode(&file).unwrap();
        let table: toml::Table = toml::from_str(&text).unwrap();
        assert_eq!(table.get("build"), Some(&toml::Value::Boolean(true)));
        assert_eq!(table.get("launch"), Some(&toml::Value::Boolean(false)));
        assert_eq!(table.get("cache"), Some(&toml::Value::Boolean(true)));
        assert!(!table.contains_key("metadata"));
    }

    #[test]
    fn types_table_decode_reads_nested_flags() {
        let text = "[types]\nbuild = true\ncache = true\n\n[metadata]\nkey = \"value\"\n";
        let decoded = TypesTableCodec.decode(text, Path::new("l.toml")).unwrap();
        assert!(decoded.value.build);
        assert!(!decoded.value.launch);
        assert!(decoded.value.cache);
        assert!(decoded.advisory.is_none());
        let data = decoded.value.data.unwrap();
        assert_eq!(data.get("key").and_then(toml::Value::as_str), Some("value"));
    }

    #[test]
    fn types_table_decode_ignores_top_level_flags_with_advisory() {
        let text = "launch = true\n[metadata]\nkey = \"value\"\n";
        let decoded = TypesTableCodec.decode(text, Path::new("l.toml")).unwrap();
        assert!(!decoded.value.launch);
        assert!(matches!(
            decoded.advisory,
            Some(SchemaAdvisory::FlagsOutsideTypesTable { .. })
        ));
    }

    #[test]
    fn top_level_decode_discards_types_table() {
        let text = "cache = true\n[types]\nlaunch = true\nbuild = true\n";
        let decoded = TopLevelCodec.decode(text, Path::new("l.toml")).unwrap();
        assert!(decoded.value.cache);
        assert!(!decoded.value.launch);
        assert!(!decoded.value.build);
        assert_eq!(decoded.advisory, Some(SchemaAdvisory::TypesTableIgnored));
    }

    #[test]
    fn advisory_survives_typed_decode_failure() {
        let text = "[types]\nbuild = \"yes\"\n";
        let err = TypesTableCodec
            .decode(text, Path::new("l.toml"))
            .unwrap_err();
        assert!(err.advisory.is_none());

        let text = "build = true\n[types]\nbuild = \"yes\"\n";
        let err = TypesTableCodec
            .decode(text, Path::new("l.toml"))
            .unwrap_err();
        assert!(matches!(
            err.advisory,
            Some(SchemaAdvisory::FlagsOutsideTypesTable { .. })
        ));
        assert!(err.source.position().is_some());
    }

    #[test]
    fn syntax_error_has_no_advisory() {
        let err = TopLevelCodec
            .decode("build = \n", Path::new("l.toml"))
            .unwrap_err();
        assert!(err.advisory.is_none());
        assert!(err.source.position().is_some());
    }

    #[test]
    fn data_may_be_a_non_table_value() {
        let file = LayerMetadataFile {
            data: Some(toml::Value::String("opaque".to_owned())),
            ..LayerMetadataFile::default()
        };
        let text = TypesTableCodec.encode(&file).unwrap();
        let decoded = TypesTableCodec.decode(&text, Path::new("l.toml")).unwrap();
        assert_eq!(decoded.value.data, file.data);
    }
}
