//! All-or-nothing file writes.

use std::io::Write;
use std::path::Path;

use super::error::FormatError;

/// Replace the file at `path` with `contents`.
///
/// The contents go to a temporary file next to the target which is then
/// renamed over it, so the target either keeps its old contents or holds the
/// complete new ones.
pub(crate) fn write_atomic(path: &Path, contents: &str) -> Result<(), FormatError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = tempfile::Builder::new()
        .prefix(".geodesk-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    file.write_all(contents.as_bytes())?;
    file.as_file().sync_all()?;

    // Temporary files are created private; keep the mode of the file we replace
    if let Ok(metadata) = std::fs::metadata(path) {
        file.as_file().set_permissions(metadata.permissions())?;
    }

    file.persist(path).map_err(|e| FormatError::Io(e.error))?;
    log::debug!("Wrote {} bytes to {:?}", contents.len(), path);
    Ok(())
}
