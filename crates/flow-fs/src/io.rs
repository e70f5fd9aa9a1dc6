//! Whole-file reads and atomic writes

use std::fs;
use std::io::Write;

use tempfile::NamedTempFile;

use crate::{Error, NormalizedPath, Result};

/// Replace `path` with `content` in one rename.
///
/// Each call stages into its own uniquely named sibling file, so readers
/// never see a partial file and concurrent writers to the same target
/// cannot clobber each other's staging data. The last rename wins.
pub fn write_atomic(path: &NormalizedPath, content: &[u8]) -> Result<()> {
    let target = path.to_native();
    let parent = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::path::PathBuf::from("."),
    };
    fs::create_dir_all(&parent).map_err(|e| Error::io(&parent, e))?;

    let mut staged = tempfile::Builder::new()
        .prefix(".flowsync-")
        .suffix(".tmp")
        .tempfile_in(&parent)
        .map_err(|e| Error::io(&parent, e))?;
    write_staged(&mut staged, content).map_err(|e| Error::io(staged.path(), e))?;

    staged
        .persist(&target)
        .map_err(|e| Error::io(&target, e.error))?;
    tracing::trace!(path = %path, bytes = content.len(), "Wrote file");
    Ok(())
}

fn write_staged(staged: &mut NamedTempFile, content: &[u8]) -> std::io::Result<()> {
    staged.write_all(content)?;
    staged.as_file().sync_all()
}

/// Read raw bytes from a file.
pub fn read_bytes(path: &NormalizedPath) -> Result<Vec<u8>> {
    let native_path = path.to_native();
    fs::read(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Write text content to a file atomically.
pub fn write_text(path: &NormalizedPath, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes())
}
