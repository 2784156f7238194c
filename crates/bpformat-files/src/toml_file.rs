//! Typed TOML file decoding with position-annotated errors, and atomic writes.

use crate::FormatError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Read and decode a TOML file.
///
/// A missing file surfaces as [`FormatError::Io`] with kind `NotFound`; callers
/// decide whether that is fatal.
pub fn decode_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, FormatError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    debug!("decoding {}", path.display());
    decode_str(&content, path)
}

/// Decode already-read TOML text. `path` is only used for error reporting.
pub fn decode_str<T: DeserializeOwned>(content: &str, path: &Path) -> Result<T, FormatError> {
    toml::from_str(content).map_err(|e| decode_error(content, path, e))
}

/// Serialize `value` as TOML and atomically replace `path` with it.
pub fn encode_file<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<(), FormatError> {
    let content = toml::to_string_pretty(value)?;
    write_atomic(path.as_ref(), content.as_bytes())
}

pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), FormatError> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| FormatError::Io(e.error))?;
    if let Ok(f) = fs::File::open(dir) {
        let _ = f.sync_all();
    }
    debug!("wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

fn decode_error(content: &str, path: &Path, err: toml::de::Error) -> FormatError {
    match err.span() {
        Some(span) => {
            let (line, column) = line_column(content, span.start);
            FormatError::Syntax {
                path: path.to_path_buf(),
                message: err.message().trim_end().to_owned(),
                line,
                column,
            }
        }
        None => FormatError::Parse {
            path: path.to_path_buf(),
            source: err,
        },
    }
}

/// 1-based line and column of a byte offset.
fn line_column(content: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;
    for (idx, ch) in content.char_indices() {
        if idx >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}
