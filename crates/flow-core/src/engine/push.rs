//! Local tree to tenant

use std::collections::BTreeMap;

use flow_api::model::ACTIVE;
use flow_api::{ApiClient, PackageDescriptor};
use flow_content::manifest::MANIFEST_PATH;
use flow_content::{ArtifactKind, Manifest};
use flow_fs::{NormalizedPath, tree};

use super::SyncEngine;
use crate::report::{Action, SyncReport};
use crate::worker::run_jobs;
use crate::{Error, Result};

/// A local bundle to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactUpload {
    pub id: String,
    pub name: String,
    pub kind: ArtifactKind,
    pub package_id: String,
    pub dir: NormalizedPath,
}

impl ArtifactUpload {
    /// Describe the bundle in `dir` from its manifest.
    ///
    /// The name falls back to the id when `Bundle-Name` is absent.
    pub fn from_bundle(dir: &NormalizedPath, package_id: &str) -> Result<Self> {
        let manifest = Manifest::load(dir)?;
        let id = manifest
            .symbolic_name()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::validation(format!("bundle {dir} has no Bundle-SymbolicName")))?
            .to_string();
        let name = manifest.name().unwrap_or(&id).to_string();
        Ok(Self {
            kind: manifest.kind()?,
            name,
            id,
            package_id: package_id.to_string(),
            dir: dir.clone(),
        })
    }
}

impl SyncEngine {
    /// Bring the tenant up to date with the local tree.
    pub fn push(&self) -> Result<SyncReport> {
        let config = &self.config;
        if self.client.packages().get(&config.package_id)?.is_none() {
            return Err(self.package_not_found(", run 'update package' first"));
        }

        let uploads: Vec<ArtifactUpload> = discover_bundles(&config.artifacts_dir, &config.package_id)?
            .into_iter()
            .filter(|upload| {
                let allowed = config.filter.allows(&upload.id);
                if !allowed {
                    tracing::debug!(id = %upload.id, "Artifact filtered out");
                }
                allowed
            })
            .collect();

        let work_root = config.work_dir.join("upload");
        let outcomes = run_jobs(uploads, config.parallelism, &self.cancel, |upload| {
            self.cancel.check()?;
            let action = push_artifact(&self.client, &upload, &work_root)
                .map_err(|e| Error::artifact(&upload.id, "Upload", e))?;
            Ok((upload, action))
        })?;

        let mut report = SyncReport::default();
        for (upload, action) in outcomes {
            report.record(&upload.id, upload.kind, action);
        }
        Ok(report)
    }
}

/// Every direct subdirectory of `artifacts_dir` holding a manifest.
///
/// Hidden directories are skipped. Two bundles declaring the same id are a
/// configuration error.
pub(crate) fn discover_bundles(artifacts_dir: &NormalizedPath, package_id: &str) -> Result<Vec<ArtifactUpload>> {
    if !artifacts_dir.is_dir() {
        return Err(Error::validation(format!(
            "artifacts directory {artifacts_dir} does not exist"
        )));
    }
    let mut seen: BTreeMap<String, NormalizedPath> = BTreeMap::new();
    let mut uploads = Vec::new();
    for dir in tree::list_subdirs(artifacts_dir)? {
        let hidden = dir.file_name().is_some_and(|n| n.starts_with('.'));
        if hidden || !dir.join(MANIFEST_PATH).is_file() {
            continue;
        }
        let upload = ArtifactUpload::from_bundle(&dir, package_id)?;
        if let Some(other) = seen.insert(upload.id.clone(), dir.clone()) {
            return Err(Error::validation(format!(
                "artifact id '{}' is declared by both {other} and {dir}",
                upload.id
            )));
        }
        uploads.push(upload);
    }
    Ok(uploads)
}

/// Create or update one artifact from a local bundle.
///
/// The tenant is always asked for the active version first. A missing
/// artifact is created; an existing one is downloaded into `work_root`,
/// compared, and updated only when its content differs.
pub fn push_artifact(client: &ApiClient, upload: &ArtifactUpload, work_root: &NormalizedPath) -> Result<Action> {
    let designtime = client.designtime(upload.kind);
    let status = designtime.get(&upload.id, ACTIVE)?;

    if !status.exists {
        tracing::info!(id = %upload.id, kind = %upload.kind, "Artifact does not exist on tenant, creating");
        designtime.create(&upload.id, &upload.name, &upload.package_id, &upload.dir)?;
        return Ok(Action::Created);
    }

    let remote_dir = work_root.join(&upload.id);
    designtime.download(&upload.id, ACTIVE, &remote_dir)?;
    let diff = upload.kind.diff_rules().compare(&remote_dir, &upload.dir)?;
    if let Err(e) = tree::remove_dir_if_exists(&remote_dir) {
        tracing::warn!(dir = %remote_dir, error = %e, "Failed to clean up downloaded artifact");
    }

    if !diff.changed {
        tracing::info!(id = %upload.id, kind = %upload.kind, "No changes");
        return Ok(Action::Unchanged);
    }
    tracing::info!(
        id = %upload.id,
        kind = %upload.kind,
        version = %status.version,
        differences = ?diff.differences,
        "Updating changed artifact"
    );
    designtime.update(&upload.id, &upload.name, &upload.package_id, &upload.dir)?;
    Ok(Action::Updated)
}

/// Create or update a single artifact outside a package-wide sync.
///
/// A missing package is created with the package id as its name first.
pub fn update_artifact(client: &ApiClient, upload: &ArtifactUpload, work_dir: &NormalizedPath) -> Result<Action> {
    let packages = client.packages();
    match packages.get(&upload.package_id)? {
        Some(package) if package.is_read_only() => {
            return Err(Error::validation(format!(
                "package '{}' is read-only",
                upload.package_id
            )));
        }
        Some(_) => {}
        None => {
            tracing::info!(package = %upload.package_id, "Package does not exist, creating");
            packages.create(&PackageDescriptor {
                id: upload.package_id.clone(),
                name: upload.package_id.clone(),
                short_text: Some(upload.package_id.clone()),
                ..PackageDescriptor::default()
            })?;
        }
    }
    if !upload.dir.join(MANIFEST_PATH).is_file() {
        return Err(Error::validation(format!(
            "artifact directory {} has no {MANIFEST_PATH}",
            upload.dir
        )));
    }
    push_artifact(client, upload, &work_dir.join("upload"))
}
