//! Whole-directory operations
//!
//! Bundles are materialized by staging a complete copy next to the target
//! and swapping it in with renames, so a reader never observes a half
//! written artifact directory.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::{Error, NormalizedPath, Result};

/// List every regular file below `root` as a sorted set of
/// forward-slash paths relative to `root`.
///
/// A missing root yields an empty set.
pub fn list_files(root: &NormalizedPath) -> Result<BTreeSet<String>> {
    let mut files = BTreeSet::new();
    if !root.exists() {
        return Ok(files);
    }
    if !root.is_dir() {
        return Err(Error::NotADirectory {
            path: root.to_native(),
        });
    }
    collect_files(&root.to_native(), "", &mut files)?;
    Ok(files)
}

fn collect_files(dir: &Path, prefix: &str, out: &mut BTreeSet<String>) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let relative = if prefix.is_empty() {
            name
        } else {
            format!("{prefix}/{name}")
        };
        let file_type = entry.file_type().map_err(|e| Error::io(entry.path(), e))?;
        if file_type.is_dir() {
            collect_files(&entry.path(), &relative, out)?;
        } else if file_type.is_file() {
            out.insert(relative);
        }
    }
    Ok(())
}

/// List the immediate subdirectories of `root`, sorted by name.
pub fn list_subdirs(root: &NormalizedPath) -> Result<Vec<NormalizedPath>> {
    let native = root.to_native();
    let entries = fs::read_dir(&native).map_err(|e| Error::io(&native, e))?;
    let mut dirs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(&native, e))?;
        if entry.path().is_dir() {
            dirs.push(NormalizedPath::new(entry.path()));
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Recursively copy `src` into `dst`, creating `dst` as needed.
pub fn copy_dir(src: &NormalizedPath, dst: &NormalizedPath) -> Result<()> {
    if !src.is_dir() {
        return Err(Error::NotADirectory {
            path: src.to_native(),
        });
    }
    for relative in list_files(src)? {
        let from = src.join(&relative).to_native();
        let to = dst.join(&relative).to_native();
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        fs::copy(&from, &to).map_err(|e| Error::io(&from, e))?;
    }
    // Empty source trees still produce the directory
    fs::create_dir_all(dst.to_native()).map_err(|e| Error::io(dst.to_native(), e))?;
    Ok(())
}

/// Replace the directory at `target` with a copy of `source`.
///
/// The copy is staged as a hidden sibling of `target`; the old directory is
/// moved aside and the staged copy renamed into place. Removing the moved
/// aside directory is best effort.
pub fn replace_dir(source: &NormalizedPath, target: &NormalizedPath) -> Result<()> {
    let name = target.file_name().ok_or_else(|| Error::InvalidPath {
        path: target.to_native(),
        reason: "target has no final component".to_string(),
    })?;
    let parent = target.parent().unwrap_or_else(|| NormalizedPath::new("."));
    let pid = std::process::id();
    let staging = parent.join(&format!(".{name}.staging.{pid}"));
    let retired = parent.join(&format!(".{name}.old.{pid}"));

    remove_dir_if_exists(&staging)?;
    copy_dir(source, &staging)?;

    if target.exists() {
        remove_dir_if_exists(&retired)?;
        fs::rename(target.to_native(), retired.to_native())
            .map_err(|e| Error::io(target.to_native(), e))?;
    }
    fs::rename(staging.to_native(), target.to_native())
        .map_err(|e| Error::io(staging.to_native(), e))?;

    if retired.exists()
        && let Err(e) = fs::remove_dir_all(retired.to_native())
    {
        tracing::warn!(path = %retired, error = %e, "Failed to remove replaced directory");
    }
    Ok(())
}

/// Remove a directory tree if present.
pub fn remove_dir_if_exists(path: &NormalizedPath) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path.to_native()).map_err(|e| Error::io(path.to_native(), e))?;
    }
    Ok(())
}

/// Create a directory and all parents.
pub fn ensure_dir(path: &NormalizedPath) -> Result<()> {
    fs::create_dir_all(path.to_native()).map_err(|e| Error::io(path.to_native(), e))
}
