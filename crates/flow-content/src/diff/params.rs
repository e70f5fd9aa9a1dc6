//! Order-insensitive comparison of `key=value` files

use std::collections::BTreeMap;

use flow_fs::{NormalizedPath, io};

use super::DiffResult;
use crate::Result;

/// Parse `key=value` lines into a sorted map.
///
/// Blank lines and lines starting with `#` or `!` are skipped. The first
/// unescaped `=` separates key from value; a line without one is a key
/// with an empty value. Later duplicates win.
pub fn parse_params(text: &str) -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }
        let (key, value) = match separator_index(line) {
            Some(idx) => (&line[..idx], &line[idx + 1..]),
            None => (line, ""),
        };
        params.insert(key.trim().to_string(), value.trim().to_string());
    }
    params
}

fn separator_index(line: &str) -> Option<usize> {
    let mut escaped = false;
    for (idx, c) in line.char_indices() {
        match c {
            '\\' if !escaped => escaped = true,
            '=' if !escaped => return Some(idx),
            _ => escaped = false,
        }
    }
    None
}

/// Compare two parameter files by key/value content.
///
/// Both missing is unchanged; one missing is changed.
pub fn diff_params(left: &NormalizedPath, right: &NormalizedPath) -> Result<DiffResult> {
    match (left.is_file(), right.is_file()) {
        (false, false) => return Ok(DiffResult::unchanged()),
        (true, false) => return Ok(DiffResult::changed("file missing on right side")),
        (false, true) => return Ok(DiffResult::changed("file missing on left side")),
        (true, true) => {}
    }

    let left_params = parse_params(&io::read_text(left)?);
    let right_params = parse_params(&io::read_text(right)?);
    let mut result = DiffResult::unchanged();

    for (key, left_value) in &left_params {
        match right_params.get(key) {
            Some(right_value) if right_value == left_value => {}
            Some(_) => result.push(format!("value of '{key}' differs")),
            None => result.push(format!("'{key}' only on left side")),
        }
    }
    for key in right_params.keys().filter(|k| !left_params.contains_key(*k)) {
        result.push(format!("'{key}' only on right side"));
    }

    Ok(result)
}
