pub mod completions;
pub mod launch;
pub mod layer;
pub mod plan;
pub mod store;

use std::fmt::Display;
use std::path::Path;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_FORMAT_ERROR: u8 = 2;

/// Marker key `toml` uses when a datetime passes through another serializer.
const TOML_DATETIME_KEY: &str = "$__toml_private_datetime";

pub fn json_pretty(value: &impl serde::Serialize) -> Result<String, String> {
    let mut json =
        serde_json::to_value(value).map_err(|e| format!("JSON serialization failed: {e}"))?;
    flatten_toml_datetimes(&mut json);
    serde_json::to_string_pretty(&json).map_err(|e| format!("JSON serialization failed: {e}"))
}

/// Replace `toml` datetime wrappers with their RFC 3339 text.
fn flatten_toml_datetimes(value: &mut serde_json::Value) {
    let datetime = match &*value {
        serde_json::Value::Object(map) if map.len() == 1 => map
            .get(TOML_DATETIME_KEY)
            .and_then(serde_json::Value::as_str)
            .map(str::to_owned),
        _ => None,
    };
    if let Some(text) = datetime {
        *value = serde_json::Value::String(text);
        return;
    }
    match value {
        serde_json::Value::Object(map) => map.values_mut().for_each(flatten_toml_datetimes),
        serde_json::Value::Array(items) => items.iter_mut().for_each(flatten_toml_datetimes),
        _ => {}
    }
}

pub fn decode_failure(path: &Path, err: impl Display) -> String {
    format!("failed to decode {}: {err}", path.display())
}

pub fn encode_failure(path: &Path, err: impl Display) -> String {
    format!("failed to encode {}: {err}", path.display())
}

/// Render a TOML value on one line for human output.
pub fn inline_value(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
