//! File and directory manipulation utilities.

use std::io;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tempfile::NamedTempFile;

/// Writes `bytes` to `path` all-or-nothing. The content is staged in a temporary file beside
/// the target and renamed over it once complete, so a failed write never leaves a partial
/// file behind.
pub fn write_atomic(path: impl AsRef<Path>, bytes: &[u8]) -> Result<(), io::Error> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(bytes)?;
    staged.flush()?;
    staged.persist(path).map_err(|err| err.error)?;
    Ok(())
}

/// Writes a JSON-encoded, pretty-printed `value` to a given file `path`.
pub fn write_json<S: Serialize + ?Sized>(path: impl AsRef<Path>, value: &S) -> Result<(), io::Error> {
    let mut json = serde_json::to_vec_pretty(value)?;
    json.push(b'\n');
    write_atomic(path, &json)
}
