//! Script collection reference rewriting
//!
//! Integration flows reference script collections by id, both inside the
//! flow model and in the bundle manifest. When a package is copied between
//! environments those ids may need to change, so pulled bundles can be
//! rewritten with a `source:target` mapping.

use std::collections::BTreeMap;

use flow_fs::{NormalizedPath, io, tree};

use crate::manifest::{MANIFEST_PATH, Manifest};
use crate::{Error, Result};

/// Directory holding the flow model files inside an integration bundle.
const FLOW_MODEL_DIR: &str = "src/main/resources/scenarioflows/integrationflow";

/// Manifest headers that may name a script collection.
const REFERENCE_HEADERS: &[&str] = &["Import-Package", "Require-Bundle"];

/// Validated mapping from source to target script collection id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceRewriter {
    mapping: BTreeMap<String, String>,
}

impl ReferenceRewriter {
    /// Build a rewriter from `source:target` entries.
    ///
    /// Rejects empty sides, characters outside `[A-Za-z0-9_.-]`, repeated
    /// sources and targets that are themselves sources. The last rule keeps
    /// a second application from rewriting anything.
    pub fn from_pairs<S: AsRef<str>>(entries: &[S]) -> Result<Self> {
        let mut mapping = BTreeMap::new();
        for entry in entries {
            let entry = entry.as_ref().trim();
            let (source, target) = entry
                .split_once(':')
                .ok_or_else(|| invalid(entry, "expected 'source:target'"))?;
            let (source, target) = (source.trim(), target.trim());
            if source.is_empty() || target.is_empty() {
                return Err(invalid(entry, "source and target must not be empty"));
            }
            if !source.chars().all(is_id_char) || !target.chars().all(is_id_char) {
                return Err(invalid(entry, "ids may only contain letters, digits, '_', '-' and '.'"));
            }
            if mapping.insert(source.to_string(), target.to_string()).is_some() {
                return Err(invalid(entry, "source is mapped more than once"));
            }
        }
        if let Some((source, target)) = mapping.iter().find(|(_, t)| mapping.contains_key(*t)) {
            return Err(invalid(
                &format!("{source}:{target}"),
                "target is also mapped as a source",
            ));
        }
        Ok(Self { mapping })
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    /// Replace whole-token occurrences of every source id in `text`.
    pub fn rewrite_text(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut token_start: Option<usize> = None;

        for (idx, c) in text.char_indices() {
            if is_id_char(c) {
                token_start.get_or_insert(idx);
                continue;
            }
            if let Some(start) = token_start.take() {
                self.push_token(&mut out, &text[start..idx]);
            }
            out.push(c);
        }
        if let Some(start) = token_start {
            self.push_token(&mut out, &text[start..]);
        }
        out
    }

    fn push_token(&self, out: &mut String, token: &str) {
        match self.mapping.get(token) {
            Some(target) => out.push_str(target),
            None => out.push_str(token),
        }
    }

    /// Rewrite the bundle rooted at `bundle_dir` in place.
    ///
    /// Returns the bundle-relative paths of files whose content changed.
    pub fn apply(&self, bundle_dir: &NormalizedPath) -> Result<Vec<String>> {
        let mut rewritten = Vec::new();
        if self.is_empty() {
            return Ok(rewritten);
        }

        let flow_dir = bundle_dir.join(FLOW_MODEL_DIR);
        for relative in tree::list_files(&flow_dir)? {
            if !relative.ends_with(".iflw") {
                continue;
            }
            let path = flow_dir.join(&relative);
            let original = io::read_text(&path)?;
            let updated = self.rewrite_text(&original);
            if updated != original {
                io::write_text(&path, &updated)?;
                rewritten.push(format!("{FLOW_MODEL_DIR}/{relative}"));
            }
        }

        let mut manifest = Manifest::load(bundle_dir)?;
        let mut manifest_changed = false;
        for header in REFERENCE_HEADERS {
            if let Some(value) = manifest.get(header) {
                let updated = self.rewrite_text(value);
                if updated != value {
                    manifest.set(header, &updated);
                    manifest_changed = true;
                }
            }
        }
        if manifest_changed {
            manifest.save(bundle_dir)?;
            rewritten.push(MANIFEST_PATH.to_string());
        }

        if !rewritten.is_empty() {
            tracing::debug!(bundle = %bundle_dir, files = ?rewritten, "Rewrote script collection references");
        }
        Ok(rewritten)
    }
}

fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')
}

fn invalid(entry: &str, reason: &str) -> Error {
    Error::InvalidMapping {
        entry: entry.to_string(),
        reason: reason.to_string(),
    }
}
