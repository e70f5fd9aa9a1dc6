//! Tenant to local tree

use std::collections::BTreeMap;

use flow_api::Artifact;
use flow_api::model::ACTIVE;
use flow_content::{JsonDiff, ReferenceRewriter, bundle};
use flow_fs::{NormalizedPath, io, tree};
use flow_git::Author;
use serde_json::Value;

use super::SyncEngine;
use crate::config::DraftPolicy;
use crate::naming;
use crate::report::{Action, SyncReport};
use crate::worker::run_jobs;
use crate::{Error, Result};

impl SyncEngine {
    /// Bring the local tree up to date with the tenant.
    pub fn pull(&self) -> Result<SyncReport> {
        let config = &self.config;
        let packages = self.client.packages();
        let package = packages
            .get(&config.package_id)?
            .ok_or_else(|| self.package_not_found(""))?;
        if package.is_read_only() {
            tracing::warn!(
                package = %config.package_id,
                "Package is read-only and cannot be synced, skipping"
            );
            return Ok(SyncReport::read_only());
        }

        let mut report = SyncReport::default();
        tree::ensure_dir(&config.artifacts_dir)?;

        if config.sync_package_details {
            report.package_details_written = self.write_package_details(&package.raw)?;
        }

        let mut selected = Vec::new();
        for artifact in packages.list_all_artifacts(&config.package_id)? {
            if !config.filter.allows(&artifact.id) {
                tracing::debug!(id = %artifact.id, "Artifact filtered out");
                continue;
            }
            if artifact.draft {
                match config.draft_policy {
                    DraftPolicy::Skip => {
                        tracing::warn!(id = %artifact.id, "Artifact is in draft version, skipping");
                        report.record(&artifact.id, artifact.kind, Action::SkippedDraft);
                        continue;
                    }
                    DraftPolicy::Error => {
                        return Err(Error::DraftConflict { id: artifact.id });
                    }
                    DraftPolicy::Add => {
                        tracing::info!(id = %artifact.id, "Adding draft artifact");
                    }
                }
            }
            selected.push(artifact);
        }

        let jobs = self.assign_directories(selected)?;
        let rewriter = config.rewriter()?;
        let download_root = config.work_dir.join("download");
        tree::ensure_dir(&download_root)?;

        let outcomes = run_jobs(jobs, config.parallelism, &self.cancel, |(artifact, dir)| {
            let action = self
                .pull_artifact(&artifact, &dir, &download_root, &rewriter)
                .map_err(|e| Error::artifact(&artifact.id, "Download", e))?;
            Ok((artifact, action))
        })?;
        for (artifact, action) in outcomes {
            report.record(&artifact.id, artifact.kind, action);
        }

        if config.commit.skip {
            tracing::info!("Skipping git commit");
        } else {
            let author = Author::new(&config.commit.user, &config.commit.email);
            report.commit = flow_git::commit_all(&config.git_repo_dir, &config.commit.message, &author)?;
            match &report.commit {
                Some(commit) => tracing::info!(hash = %commit.hash, "Committed changes"),
                None => tracing::info!("No changes to commit"),
            }
        }
        Ok(report)
    }

    /// Pair each artifact with its local directory, rejecting collisions.
    ///
    /// Names are compared case-insensitively so the layout also works on
    /// case-insensitive filesystems.
    fn assign_directories(&self, artifacts: Vec<Artifact>) -> Result<Vec<(Artifact, NormalizedPath)>> {
        let mut seen: BTreeMap<String, String> = BTreeMap::new();
        let mut jobs = Vec::with_capacity(artifacts.len());
        for artifact in artifacts {
            let dir_name = naming::resolve(self.config.naming, &artifact.id, &artifact.name)?;
            if let Some(other) = seen.insert(dir_name.to_lowercase(), artifact.id.clone()) {
                return Err(Error::validation(format!(
                    "artifacts '{other}' and '{}' both map to directory '{dir_name}' in {} naming mode",
                    artifact.id, self.config.naming
                )));
            }
            let dir = self.config.artifacts_dir.join(&dir_name);
            jobs.push((artifact, dir));
        }
        Ok(jobs)
    }

    fn pull_artifact(
        &self,
        artifact: &Artifact,
        local_dir: &NormalizedPath,
        download_root: &NormalizedPath,
        rewriter: &ReferenceRewriter,
    ) -> Result<Action> {
        self.cancel.check()?;
        let designtime = self.client.designtime(artifact.kind);
        let content = designtime.get_content(&artifact.id, ACTIVE)?;

        let archive = download_root.join(&format!("{}.zip", artifact.id));
        io::write_atomic(&archive, &content)?;
        let unpacked = download_root.join(&artifact.id);
        tree::remove_dir_if_exists(&unpacked)?;
        bundle::unpack(&content, &unpacked)?;

        if !rewriter.is_empty() {
            let rewritten = rewriter.apply(&unpacked)?;
            if !rewritten.is_empty() {
                tracing::debug!(id = %artifact.id, files = ?rewritten, "Rewrote script collection references");
            }
        }

        let diff = artifact.kind.diff_rules().compare(local_dir, &unpacked)?;
        if !diff.changed {
            tracing::info!(id = %artifact.id, kind = %artifact.kind, "No changes");
            return Ok(Action::Unchanged);
        }
        tracing::info!(
            id = %artifact.id,
            kind = %artifact.kind,
            dir = %local_dir,
            differences = ?diff.differences,
            "Writing changed artifact"
        );
        tree::replace_dir(&unpacked, local_dir)?;
        Ok(Action::Written)
    }

    /// Write `<package_id>.json` unless the stored copy is equivalent.
    fn write_package_details(&self, raw: &Value) -> Result<bool> {
        let path = self
            .config
            .artifacts_dir
            .join(&format!("{}.json", self.config.package_id));
        if path.is_file() {
            let existing: Value = serde_json::from_str(&io::read_text(&path)?)?;
            let diff = JsonDiff::compute(&existing, raw);
            if diff.is_equivalent {
                tracing::info!(path = %path, "Package details unchanged");
                return Ok(false);
            }
            tracing::info!(path = %path, changed = ?diff.changed_paths(), "Package details changed");
        }
        tracing::info!(path = %path, "Writing package details");
        let mut text = serde_json::to_string_pretty(raw)?;
        text.push('\n');
        io::write_text(&path, &text)?;
        Ok(true)
    }
}
