//! Packing and unpacking artifact archives
//!
//! The remote side exchanges bundles as zip archives. Unpacking validates
//! every entry against path traversal before anything is written.

use std::io::{Cursor, Read, Write};
use std::path::{Component, Path};

use flow_fs::{NormalizedPath, io, tree};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::manifest::MANIFEST_PATH;
use crate::{Error, Result};

/// Zip every file below `dir` into an in-memory archive.
///
/// Entries are added in sorted order so the same tree always yields the
/// same entry list.
pub fn pack_dir(dir: &NormalizedPath) -> Result<Vec<u8>> {
    if !dir.join(MANIFEST_PATH).is_file() {
        return Err(Error::MissingManifest {
            path: dir.to_native(),
        });
    }

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    for relative in tree::list_files(dir)? {
        let content = io::read_bytes(&dir.join(&relative))?;
        writer.start_file(relative.as_str(), options)?;
        writer.write_all(&content)?;
    }

    let cursor = writer.finish()?;
    Ok(cursor.into_inner())
}

/// Unpack an archive into `dest`, which is created if missing.
///
/// Fails without writing anything if an entry escapes `dest`, and after
/// writing if the archive carried no manifest. Returns the relative paths
/// of the files written.
pub fn unpack(bytes: &[u8], dest: &NormalizedPath) -> Result<Vec<String>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let mut entries = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let file = archive.by_index(index)?;
        let name = file.name().to_string();
        validate_entry_path(&name)?;
        entries.push((index, name, file.is_dir()));
    }

    tree::ensure_dir(dest)?;
    let mut written = Vec::new();
    for (index, name, is_dir) in entries {
        let target = dest.join(&name);
        if is_dir {
            tree::ensure_dir(&target)?;
            continue;
        }
        let mut file = archive.by_index(index)?;
        let mut content = Vec::new();
        file.read_to_end(&mut content)?;
        io::write_atomic(&target, &content)?;
        written.push(name.trim_start_matches("./").to_string());
    }

    if !dest.join(MANIFEST_PATH).is_file() {
        return Err(Error::MissingManifest {
            path: dest.to_native(),
        });
    }

    tracing::debug!(dest = %dest, files = written.len(), "Unpacked bundle");
    Ok(written)
}

/// Reject absolute entries and any `..` component.
fn validate_entry_path(name: &str) -> Result<()> {
    let normalized = name.replace('\\', "/");
    let path = Path::new(&normalized);
    let escapes = path.is_absolute()
        || normalized.starts_with('/')
        || path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_) | Component::RootDir));
    if escapes {
        return Err(Error::PathTraversal {
            path: name.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::parent_dir("../escape.txt")]
    #[case::nested_parent("META-INF/../../escape.txt")]
    #[case::absolute("/etc/passwd")]
    #[case::backslash_parent("..\\escape.txt")]
    fn rejects_path_traversal(#[case] name: &str) {
        assert!(matches!(
            validate_entry_path(name),
            Err(Error::PathTraversal { .. })
        ));
    }

    #[rstest]
    #[case("META-INF/MANIFEST.MF")]
    #[case("src/main/resources/script/a.groovy")]
    #[case("./metainfo.prop")]
    fn accepts_bundle_paths(#[case] name: &str) {
        assert!(validate_entry_path(name).is_ok());
    }
}
