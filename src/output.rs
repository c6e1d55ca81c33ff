//! Atomic file output.

use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Write `contents` to `path` via a temporary file in the same directory and
/// an atomic rename, so readers never see a partial file.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let parent_dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut temp_file = NamedTempFile::new_in(parent_dir)?;

    temp_file.write_all(contents)?;
    temp_file.as_file().sync_all()?;

    temp_file.persist(path).map_err(|e| e.error)?;

    Ok(())
}
