//! Deciding whether two copies of a bundle differ
//!
//! Comparison is structural rather than byte-for-byte: line endings,
//! parameter and mapping line ordering and volatile manifest headers are
//! not differences.
//! Each artifact kind declares which parts of a bundle count through a
//! [`DiffRules`] set.

mod json;
mod lines;
mod params;
mod tree;

pub use json::{JsonChange, JsonDiff};
pub use lines::{diff_lines, line_counts};
pub use params::{diff_params, parse_params};
pub use tree::diff_directories;

use flow_fs::NormalizedPath;

use crate::Result;

/// Outcome of a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiffResult {
    /// True when the two sides differ in a meaningful way
    pub changed: bool,
    /// Human-readable description of each difference, for logging
    pub differences: Vec<String>,
}

impl DiffResult {
    pub fn unchanged() -> Self {
        Self::default()
    }

    pub fn changed(difference: impl Into<String>) -> Self {
        Self {
            changed: true,
            differences: vec![difference.into()],
        }
    }

    pub fn push(&mut self, difference: impl Into<String>) {
        self.changed = true;
        self.differences.push(difference.into());
    }

    pub fn merge(&mut self, other: DiffResult) {
        self.changed |= other.changed;
        self.differences.extend(other.differences);
    }
}

/// One part of a bundle and how to compare it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffRule {
    /// Recursive directory comparison, skipping `ignored` relative paths
    Directory { path: String, ignored: Vec<String> },
    /// Order-insensitive `key=value` comparison of a single file
    Params { path: String },
    /// Order-insensitive comparison of a single file's lines, counting repeats
    Lines { path: String },
}

impl DiffRule {
    pub fn directory(path: &str) -> Self {
        Self::Directory {
            path: path.to_string(),
            ignored: Vec::new(),
        }
    }

    pub fn params(path: &str) -> Self {
        Self::Params {
            path: path.to_string(),
        }
    }

    pub fn lines(path: &str) -> Self {
        Self::Lines {
            path: path.to_string(),
        }
    }

    /// Skip a path (relative to this rule's directory). No-op for single-file rules.
    pub fn ignoring(mut self, relative: &str) -> Self {
        if let Self::Directory { ignored, .. } = &mut self {
            ignored.push(relative.to_string());
        }
        self
    }

    fn apply(&self, left_root: &NormalizedPath, right_root: &NormalizedPath) -> Result<DiffResult> {
        match self {
            Self::Directory { path, ignored } => {
                let mut result =
                    diff_directories(&left_root.join(path), &right_root.join(path), ignored)?;
                for difference in &mut result.differences {
                    *difference = format!("{path}/{difference}");
                }
                Ok(result)
            }
            Self::Params { path } | Self::Lines { path } => {
                let (left, right) = (left_root.join(path), right_root.join(path));
                let mut result = match self {
                    Self::Params { .. } => diff_params(&left, &right)?,
                    _ => diff_lines(&left, &right)?,
                };
                for difference in &mut result.differences {
                    *difference = format!("{path}: {difference}");
                }
                Ok(result)
            }
        }
    }
}

/// The set of rules deciding identity for one artifact kind.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiffRules {
    rules: Vec<DiffRule>,
}

impl DiffRules {
    pub fn new(rules: Vec<DiffRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[DiffRule] {
        &self.rules
    }

    /// Additionally ignore a bundle-relative path in every directory rule
    /// that contains it.
    pub fn ignoring(mut self, bundle_relative: &str) -> Self {
        for rule in &mut self.rules {
            if let DiffRule::Directory { path, ignored } = rule
                && let Some(rest) = bundle_relative.strip_prefix(path.as_str())
                && let Some(rest) = rest.strip_prefix('/')
            {
                ignored.push(rest.to_string());
            }
        }
        self
    }

    /// Compare two bundle roots under every rule.
    pub fn compare(&self, left: &NormalizedPath, right: &NormalizedPath) -> Result<DiffResult> {
        let mut result = DiffResult::unchanged();
        for rule in &self.rules {
            result.merge(rule.apply(left, right)?);
        }
        Ok(result)
    }
}
