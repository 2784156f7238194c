use super::{decode_failure, json_pretty, EXIT_SUCCESS};
use bpformat_api::ApiVersion;
use bpformat_files::decode_launch_descriptor;
use std::path::Path;
use tracing::debug;

pub fn run(path: &Path, api: &ApiVersion, buildpack_id: &str, json: bool) -> Result<u8, String> {
    let descriptor = decode_launch_descriptor(path, api).map_err(|e| decode_failure(path, e))?;
    let processes = descriptor.to_launch_processes(buildpack_id);
    debug!(
        "{} processes, {} labels, {} slices in {}",
        processes.len(),
        descriptor.labels.len(),
        descriptor.slices.len(),
        path.display()
    );

    if json {
        let payload = serde_json::json!({
            "processes": processes,
            "labels": descriptor.labels,
            "slices": descriptor.slices,
            "bom": descriptor.bom,
        });
        println!("{}", json_pretty(&payload)?);
        return Ok(EXIT_SUCCESS);
    }

    if processes.is_empty() {
        println!("no processes declared in {}", path.display());
    }
    for process in &processes {
        let marker = if process.default { " (default)" } else { "" };
        println!("{}{marker}", process.r#type);
        println!("  command: {}", process.command.entries().join(" "));
        if !process.args.is_empty() {
            println!("  args:    {}", process.args.join(" "));
        }
        println!("  direct:  {}", process.direct);
        if !process.working_directory.is_empty() {
            println!("  workdir: {}", process.working_directory);
        }
        if !process.buildpack_id.is_empty() {
            println!("  buildpack: {}", process.buildpack_id);
        }
    }
    for label in &descriptor.labels {
        println!("label {}={}", label.key, label.value);
    }
    for (index, slice) in descriptor.slices.iter().enumerate() {
        println!("slice {index}: {}", slice.paths.join(", "));
    }
    Ok(EXIT_SUCCESS)
}
