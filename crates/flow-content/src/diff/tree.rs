//! Recursive directory comparison

use std::collections::BTreeSet;

use flow_fs::{NormalizedPath, io, tree};
use similar::{ChangeTag, TextDiff};

use super::DiffResult;
use crate::Result;
use crate::manifest::Manifest;

/// Compare two directory trees.
///
/// `ignored` holds paths relative to the roots; an entry matches the file
/// itself or everything below it. Both roots missing counts as unchanged,
/// one missing as changed.
pub fn diff_directories(
    left: &NormalizedPath,
    right: &NormalizedPath,
    ignored: &[String],
) -> Result<DiffResult> {
    match (left.is_dir(), right.is_dir()) {
        (false, false) => return Ok(DiffResult::unchanged()),
        (true, false) => return Ok(DiffResult::changed("directory missing on right side")),
        (false, true) => return Ok(DiffResult::changed("directory missing on left side")),
        (true, true) => {}
    }

    let left_files = visible_files(left, ignored)?;
    let right_files = visible_files(right, ignored)?;
    let mut result = DiffResult::unchanged();

    for only_left in left_files.difference(&right_files) {
        result.push(format!("{only_left}: only on left side"));
    }
    for only_right in right_files.difference(&left_files) {
        result.push(format!("{only_right}: only on right side"));
    }
    for common in left_files.intersection(&right_files) {
        if let Some(reason) = compare_file(&left.join(common), &right.join(common))? {
            result.push(format!("{common}: {reason}"));
        }
    }

    if result.changed {
        tracing::debug!(left = %left, right = %right, differences = ?result.differences, "Directories differ");
    }
    Ok(result)
}

fn visible_files(root: &NormalizedPath, ignored: &[String]) -> Result<BTreeSet<String>> {
    let files = tree::list_files(root)?;
    Ok(files
        .into_iter()
        .filter(|file| !is_ignored(file, ignored))
        .collect())
}

fn is_ignored(file: &str, ignored: &[String]) -> bool {
    ignored.iter().any(|entry| {
        let entry = entry.trim_end_matches('/');
        file == entry
            || file
                .strip_prefix(entry)
                .is_some_and(|rest| rest.starts_with('/'))
    })
}

/// Returns a description of the difference, or `None` when equivalent.
fn compare_file(left: &NormalizedPath, right: &NormalizedPath) -> Result<Option<String>> {
    let left_bytes = io::read_bytes(left)?;
    let right_bytes = io::read_bytes(right)?;
    if left_bytes == right_bytes {
        return Ok(None);
    }

    let (Ok(left_text), Ok(right_text)) = (
        std::str::from_utf8(&left_bytes),
        std::str::from_utf8(&right_bytes),
    ) else {
        return Ok(Some("binary content differs".to_string()));
    };

    if left.file_name() == Some("MANIFEST.MF")
        && let (Ok(l), Ok(r)) = (Manifest::parse(left_text), Manifest::parse(right_text))
    {
        return Ok((l.stable_headers() != r.stable_headers())
            .then(|| "manifest headers differ".to_string()));
    }

    let left_text = normalize_text(left_text);
    let right_text = normalize_text(right_text);
    if left_text == right_text {
        return Ok(None);
    }

    let changed_lines = TextDiff::from_lines(&left_text, &right_text)
        .iter_all_changes()
        .filter(|c| c.tag() != ChangeTag::Equal)
        .count();
    Ok(Some(format!("{changed_lines} line(s) differ")))
}

/// CRLF to LF and no trailing blank lines.
fn normalize_text(text: &str) -> String {
    text.replace("\r\n", "\n").trim_end().to_string()
}
