//! Order-insensitive comparison of line-oriented files

use std::collections::BTreeMap;

use flow_fs::{NormalizedPath, io};

use super::DiffResult;
use crate::Result;

/// Count each trimmed, non-blank line of `text`.
///
/// Repeated lines keep their multiplicity, so dropping one of two identical
/// entries is still a difference.
pub fn line_counts(text: &str) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        *counts.entry(line).or_insert(0) += 1;
    }
    counts
}

/// Compare two files as multisets of lines.
///
/// Both missing is unchanged; one missing is changed.
pub fn diff_lines(left: &NormalizedPath, right: &NormalizedPath) -> Result<DiffResult> {
    match (left.is_file(), right.is_file()) {
        (false, false) => return Ok(DiffResult::unchanged()),
        (true, false) => return Ok(DiffResult::changed("file missing on right side")),
        (false, true) => return Ok(DiffResult::changed("file missing on left side")),
        (true, true) => {}
    }

    let left_text = io::read_text(left)?;
    let right_text = io::read_text(right)?;
    let left_lines = line_counts(&left_text);
    let right_lines = line_counts(&right_text);
    let mut result = DiffResult::unchanged();

    for (line, &count) in &left_lines {
        let other = right_lines.get(line).copied().unwrap_or(0);
        if other < count {
            result.push(format!("'{line}' only on left side"));
        }
    }
    for (line, &count) in &right_lines {
        let other = left_lines.get(line).copied().unwrap_or(0);
        if other < count {
            result.push(format!("'{line}' only on right side"));
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_trimmed_lines_with_multiplicity() {
        let counts = line_counts("  <entry/>\n<entry/>\r\n\n<group id=\"G1\">\n");
        assert_eq!(counts.get("<entry/>"), Some(&2));
        assert_eq!(counts.get("<group id=\"G1\">"), Some(&1));
        assert_eq!(counts.len(), 2);
    }
}
