//! Local directory names for artifacts

use crate::config::NamingMode;
use crate::{Error, Result};

const UNSAFE_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Directory name of an artifact below the artifacts directory.
///
/// In `Id` mode the id is used verbatim. In `Name` mode path-unsafe and
/// control characters become `_` and trailing dots and spaces are trimmed.
pub fn resolve(mode: NamingMode, id: &str, name: &str) -> Result<String> {
    let resolved = match mode {
        NamingMode::Id => id.to_string(),
        NamingMode::Name => sanitize(name),
    };
    if resolved.is_empty() || resolved == "." || resolved == ".." {
        return Err(Error::validation(format!(
            "artifact '{id}' resolves to an empty directory name in {mode} mode"
        )));
    }
    Ok(resolved)
}

fn sanitize(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if UNSAFE_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    replaced.trim_end_matches(['.', ' ']).to_string()
}
