use super::{decode_failure, encode_failure, json_pretty, EXIT_SUCCESS};
use bpformat_api::{ApiVersion, LAYER_TYPES_TABLE};
use bpformat_files::{decode_file, decode_layer_metadata, encode_layer_metadata, LayerMetadataFile};
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, Default)]
pub struct Flags {
    pub build: bool,
    pub launch: bool,
    pub cache: bool,
}

impl Flags {
    fn any(self) -> bool {
        self.build || self.launch || self.cache
    }
}

pub fn read(path: &Path, api: &ApiVersion, json: bool) -> Result<u8, String> {
    let decoded = match decode_layer_metadata(path, api) {
        Ok(decoded) => decoded,
        Err(err) => {
            if let Some(advisory) = &err.advisory {
                warn!("{advisory}");
            }
            return Err(decode_failure(path, err));
        }
    };
    if let Some(advisory) = &decoded.advisory {
        warn!("{advisory}");
    }

    let file = &decoded.value;
    if json {
        let payload = serde_json::json!({
            "path": path.display().to_string(),
            "api": api.to_string(),
            "build": file.build,
            "launch": file.launch,
            "cache": file.cache,
            "data": file.data,
            "advisory": decoded.advisory.as_ref().map(ToString::to_string),
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!("api:     {api}");
        println!("build:   {}", file.build);
        println!("launch:  {}", file.launch);
        println!("cache:   {}", file.cache);
        match &file.data {
            Some(toml::Value::Table(table)) if !table.is_empty() => {
                let rendered = toml::to_string_pretty(table)
                    .map_err(|e| format!("failed to render layer data: {e}"))?;
                println!("data:");
                for line in rendered.lines() {
                    println!("  {line}");
                }
            }
            Some(value) if !matches!(value, toml::Value::Table(_)) => {
                println!("data:    {value}");
            }
            _ => println!("data:    (none)"),
        }
    }
    Ok(EXIT_SUCCESS)
}

pub fn write(
    path: &Path,
    api: &ApiVersion,
    data: Option<&Path>,
    flags: Flags,
    json: bool,
) -> Result<u8, String> {
    let data = match data {
        Some(data_path) => {
            let table: toml::Table =
                decode_file(data_path).map_err(|e| decode_failure(data_path, e))?;
            Some(toml::Value::Table(table))
        }
        None => None,
    };

    if flags.any() && api.at_least(&LAYER_TYPES_TABLE) {
        warn!("buildpack API {api} does not write layer flags; only metadata is stored");
    }

    let file = LayerMetadataFile {
        data,
        build: flags.build,
        launch: flags.launch,
        cache: flags.cache,
    };
    encode_layer_metadata(path, &file, api).map_err(|e| encode_failure(path, e))?;
    info!("wrote layer metadata to {}", path.display());

    if json {
        let payload = serde_json::json!({
            "path": path.display().to_string(),
            "api": api.to_string(),
            "written": true,
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!("wrote {} for buildpack API {api}", path.display());
    }
    Ok(EXIT_SUCCESS)
}
