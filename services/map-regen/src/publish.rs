//! Atomic replacement of the published map.
//!
//! The new file is written to a temporary file in the destination's
//! directory, flushed to disk, then renamed over the destination. Readers
//! see either the previous map or the new one, never a partial write, and a
//! failure at any step leaves the previous map in place.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use map_common::{MapError, MapResult};
use tempfile::NamedTempFile;
use tracing::debug;

/// Atomically replace `path` with `bytes`. Returns the bytes written.
pub fn publish_atomically(path: &Path, bytes: &[u8]) -> MapResult<u64> {
    publish_with(path, |file| file.write_all(bytes))
}

/// Atomically replace `path` with whatever `write` produces.
///
/// If `write` fails the temporary file is removed and `path` is untouched.
pub fn publish_with<F>(path: &Path, write: F) -> MapResult<u64>
where
    F: FnOnce(&mut NamedTempFile) -> io::Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    write(&mut tmp)?;
    tmp.as_file_mut().flush()?;
    tmp.as_file().sync_all()?;
    let written = tmp.as_file().metadata()?.len();

    tmp.persist(path).map_err(|e| {
        MapError::Io(io::Error::new(
            e.error.kind(),
            format!("cannot replace {}: {}", path.display(), e.error),
        ))
    })?;

    debug!(path = %path.display(), bytes = written, "Published map");
    Ok(written)
}
