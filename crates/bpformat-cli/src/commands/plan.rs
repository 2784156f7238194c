use super::{decode_failure, inline_value, json_pretty, EXIT_SUCCESS};
use bpformat_api::{ApiVersion, PLAN_METADATA_VERSION};
use bpformat_files::{decode_build_descriptor, decode_build_plan, decode_plan, VersionChecks};
use std::path::Path;
use tracing::{debug, warn};

/// Validate where a build plan puts requirement versions.
///
/// From API 0.3 a requirement may not carry both `version` and
/// `metadata.version`, and a top-level `version` is deprecated. Earlier APIs
/// only reject the two when they disagree.
pub fn check(path: &Path, api: &ApiVersion, json: bool) -> Result<u8, String> {
    let plan = decode_build_plan(path).map_err(|e| decode_failure(path, e))?;

    let doubly = plan.has_doubly_specified_versions();
    let inconsistent = plan.has_inconsistent_versions();
    let top_level = plan.has_top_level_versions();
    debug!(
        "build plan {}: requires={} doubly={doubly} inconsistent={inconsistent} top_level={top_level}",
        path.display(),
        plan.has_requires()
    );

    if api.at_least(&PLAN_METADATA_VERSION) {
        if doubly {
            return Err(decode_failure(
                path,
                "a requirement sets both \"version\" and \"metadata.version\"; use \"metadata.version\"",
            ));
        }
        if top_level {
            warn!(
                "{}: \"version\" in build plan requirements is deprecated in buildpack API {PLAN_METADATA_VERSION}; use \"metadata.version\"",
                path.display()
            );
        }
    } else if inconsistent {
        return Err(decode_failure(
            path,
            "a requirement's \"version\" does not match its \"metadata.version\"",
        ));
    }

    if json {
        let payload = serde_json::json!({
            "path": path.display().to_string(),
            "api": api.to_string(),
            "has_requires": plan.has_requires(),
            "alternatives": plan.or.len(),
            "doubly_specified_versions": doubly,
            "inconsistent_versions": inconsistent,
            "top_level_versions": top_level,
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!("requires:     {}", plan.has_requires());
        println!("alternatives: {}", plan.or.len());
        println!("versions:     ok");
    }
    Ok(EXIT_SUCCESS)
}

/// Print the BOM a buildpack plan contributes, minus anything `build.toml` lists as unmet.
pub fn bom(path: &Path, build: Option<&Path>, json: bool) -> Result<u8, String> {
    let mut plan = decode_plan(path).map_err(|e| decode_failure(path, e))?;
    if let Some(build_path) = build {
        let descriptor =
            decode_build_descriptor(build_path).map_err(|e| decode_failure(build_path, e))?;
        let before = plan.entries.len();
        plan = plan.filter(&descriptor.unmet);
        debug!(
            "dropped {} unmet entries listed in {}",
            before - plan.entries.len(),
            build_path.display()
        );
    }
    let bom = plan.to_bom();

    if json {
        println!("{}", json_pretty(&bom)?);
        return Ok(EXIT_SUCCESS);
    }

    if bom.is_empty() {
        println!("no BOM entries");
    }
    for entry in &bom {
        let version = if entry.version.is_empty() {
            entry.metadata_version()
        } else {
            Some(entry.version.clone())
        };
        match version {
            Some(version) => println!("{} {version}", entry.name),
            None => println!("{}", entry.name),
        }
        for (key, value) in entry.metadata.iter().filter(|(key, _)| *key != "version") {
            println!("  {key} = {}", inline_value(value));
        }
    }
    Ok(EXIT_SUCCESS)
}
