use super::{decode_failure, inline_value, json_pretty, EXIT_SUCCESS};
use bpformat_files::decode_store;
use std::path::Path;

pub fn run(path: &Path, json: bool) -> Result<u8, String> {
    let store = decode_store(path).map_err(|e| decode_failure(path, e))?;
    if json {
        println!("{}", json_pretty(&store)?);
    } else if store.data.is_empty() {
        println!("no metadata in {}", path.display());
    } else {
        for (key, value) in &store.data {
            println!("{key} = {}", inline_value(value));
        }
    }
    Ok(EXIT_SUCCESS)
}
