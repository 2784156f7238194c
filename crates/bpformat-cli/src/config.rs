//! Environment-backed CLI configuration.

use bpformat_api::ApiVersion;
use tracing::{debug, warn};

/// Log filter directives, e.g. `BPFORMAT_LOG=debug`.
pub const LOG_ENV: &str = "BPFORMAT_LOG";

/// Buildpack API used when `--api` is not given.
pub const API_ENV: &str = "BPFORMAT_BUILDPACK_API";

/// Resolve the buildpack API: `--api`, then `$BPFORMAT_BUILDPACK_API`, then the latest supported.
pub fn resolve_api(flag: Option<&str>) -> Result<ApiVersion, String> {
    let env_value = std::env::var(API_ENV).ok();
    resolve_api_from(flag, env_value.as_deref())
}

fn resolve_api_from(flag: Option<&str>, env_value: Option<&str>) -> Result<ApiVersion, String> {
    let (source, raw) = match (flag, env_value.filter(|v| !v.trim().is_empty())) {
        (Some(raw), _) => ("--api", raw),
        (None, Some(raw)) => (API_ENV, raw),
        (None, None) => {
            let latest = ApiVersion::latest();
            debug!("no buildpack API given, using {latest}");
            return Ok(latest);
        }
    };
    let api = ApiVersion::parse(raw.trim())
        .map_err(|e| format!("invalid buildpack API from {source}: {e}"))?;
    if !api.is_supported() {
        warn!("buildpack API {api} is not in the supported set; decoding with the nearest layout");
    }
    debug!("buildpack API {api} (from {source})");
    Ok(api)
}
