//! Designtime artifact lifecycle
//!
//! All four artifact kinds share one implementation. What differs per kind
//! (entity set, deploy function, update strategy) lives in a
//! [`KindEndpoints`] table rather than in separate types.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use flow_content::{ArtifactKind, bundle, manifest};
use flow_fs::{NormalizedPath, tree};
use serde::Serialize;

use crate::client::{ApiClient, expect_success, odata_key};
use crate::model::{ACTIVE, ArtifactEntity, ArtifactStatus, Envelope};
use crate::transport::Request;
use crate::{Error, Result};

/// Version stamped into newly created artifacts.
pub const INITIAL_VERSION: &str = "1.0.0";

/// How an existing artifact receives new content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStrategy {
    /// PUT the new content over the active version
    InPlace,
    /// No partial update available: delete, then create again
    Recreate,
}

/// Per-kind endpoint table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindEndpoints {
    pub entity_set: String,
    pub deploy_function: String,
    pub update: UpdateStrategy,
}

impl KindEndpoints {
    pub fn for_kind(kind: ArtifactKind) -> Self {
        let name = kind.as_str();
        Self {
            entity_set: format!("{name}DesigntimeArtifacts"),
            deploy_function: format!("Deploy{name}DesigntimeArtifact"),
            update: match kind {
                ArtifactKind::ValueMapping => UpdateStrategy::Recreate,
                _ => UpdateStrategy::InPlace,
            },
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct CreateBody<'a> {
    id: &'a str,
    name: &'a str,
    package_id: &'a str,
    artifact_content: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct UpdateBody<'a> {
    name: &'a str,
    artifact_content: String,
}

/// Lifecycle operations for artifacts of one kind.
#[derive(Clone)]
pub struct DesigntimeArtifact {
    client: ApiClient,
    kind: ArtifactKind,
    endpoints: KindEndpoints,
}

impl DesigntimeArtifact {
    pub(crate) fn new(client: ApiClient, kind: ArtifactKind) -> Self {
        Self {
            client,
            kind,
            endpoints: KindEndpoints::for_kind(kind),
        }
    }

    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    fn entity_path(&self, id: &str, version: &str) -> String {
        format!(
            "/api/v1/{}(Id={},Version={})",
            self.endpoints.entity_set,
            odata_key(id),
            odata_key(version)
        )
    }

    fn describe(&self, id: &str) -> String {
        format!("{} '{id}'", self.kind)
    }

    /// Look up an artifact version. `"active"` resolves to the latest
    /// saved version; a 404 yields `exists == false`.
    pub fn get(&self, id: &str, version: &str) -> Result<ArtifactStatus> {
        let request = Request::get(self.entity_path(id, version)).accept_json();
        let response = self.client.send(request)?;
        if response.status == 404 {
            return Ok(ArtifactStatus::missing());
        }
        let response = expect_success(response, &format!("Get {}", self.describe(id)))?;
        let entity: Envelope<ArtifactEntity> = response.json_body()?;
        Ok(ArtifactStatus {
            exists: true,
            version: entity.d.version,
            description: entity.d.description,
        })
    }

    /// Download the content archive of an artifact version.
    pub fn get_content(&self, id: &str, version: &str) -> Result<Vec<u8>> {
        let path = format!("{}/$value", self.entity_path(id, version));
        let response = self.client.send(Request::get(path))?;
        if response.status == 404 {
            return Err(Error::not_found(self.describe(id)));
        }
        let response = expect_success(response, &format!("Download {}", self.describe(id)))?;
        Ok(response.body)
    }

    /// Download an artifact and unpack it into `dest`.
    pub fn download(&self, id: &str, version: &str, dest: &NormalizedPath) -> Result<()> {
        let content = self.get_content(id, version)?;
        tree::remove_dir_if_exists(dest)?;
        bundle::unpack(&content, dest)?;
        Ok(())
    }

    /// Upload the bundle in `source_dir` as a new artifact at version 1.0.0.
    pub fn create(&self, id: &str, name: &str, package_id: &str, source_dir: &NormalizedPath) -> Result<()> {
        self.create_with_version(id, name, package_id, source_dir, INITIAL_VERSION)
    }

    fn create_with_version(
        &self,
        id: &str,
        name: &str,
        package_id: &str,
        source_dir: &NormalizedPath,
        version: &str,
    ) -> Result<()> {
        tracing::info!(kind = %self.kind, id, version, "Creating designtime artifact");
        let content = staged_archive(source_dir, Some(version))?;
        let request = Request::post(format!("/api/v1/{}", self.endpoints.entity_set)).json(&CreateBody {
            id,
            name,
            package_id,
            artifact_content: STANDARD.encode(content),
        })?;

        let response = self.client.send(request)?;
        let already_exists = response.status == 409
            || (!response.is_success()
                && response.text().to_ascii_lowercase().contains("already exist"));
        if already_exists {
            return Err(Error::Conflict {
                what: self.describe(id),
            });
        }
        expect_success(response, &format!("Create {}", self.describe(id)))?;
        Ok(())
    }

    /// Replace the content of an existing artifact.
    ///
    /// The uploaded manifest carries the patch-bumped active version.
    pub fn update(&self, id: &str, name: &str, package_id: &str, source_dir: &NormalizedPath) -> Result<()> {
        let current = self.get(id, ACTIVE)?;
        if !current.exists {
            return Err(Error::not_found(self.describe(id)));
        }
        let next = next_patch_version(&current.version);
        if next.is_none() {
            tracing::debug!(id, version = %current.version, "Active version is not semantic, keeping bundle version");
        }

        match self.endpoints.update {
            UpdateStrategy::InPlace => {
                tracing::info!(kind = %self.kind, id, version = ?next, "Updating designtime artifact");
                let content = staged_archive(source_dir, next.as_deref())?;
                let request = Request::put(self.entity_path(id, ACTIVE)).json(&UpdateBody {
                    name,
                    artifact_content: STANDARD.encode(content),
                })?;
                let response = self.client.send(request)?;
                expect_success(response, &format!("Update {}", self.describe(id)))?;
                Ok(())
            }
            UpdateStrategy::Recreate => {
                tracing::info!(kind = %self.kind, id, "Updating by delete followed by create");
                self.delete(id)?;
                let version = next.unwrap_or_else(|| INITIAL_VERSION.to_string());
                self.create_with_version(id, name, package_id, source_dir, &version)
            }
        }
    }

    /// Trigger deployment of the active version. Deployment completes
    /// asynchronously on the tenant.
    pub fn deploy(&self, id: &str) -> Result<()> {
        tracing::info!(kind = %self.kind, id, "Deploying designtime artifact");
        let path = format!(
            "/api/v1/{}?Id={}&Version={}",
            self.endpoints.deploy_function,
            odata_key(id),
            odata_key(ACTIVE)
        );
        let response = self.client.send(Request::post(path).accept_json())?;
        if response.status == 404 {
            return Err(Error::not_found(self.describe(id)));
        }
        expect_success(response, &format!("Deploy {}", self.describe(id)))?;
        Ok(())
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        tracing::info!(kind = %self.kind, id, "Deleting designtime artifact");
        let response = self.client.send(Request::delete(self.entity_path(id, ACTIVE)))?;
        if response.status == 404 {
            return Err(Error::not_found(self.describe(id)));
        }
        expect_success(response, &format!("Delete {}", self.describe(id)))?;
        Ok(())
    }
}

/// `1.0.3` becomes `1.0.4`; anything that is not a semantic version
/// yields `None`.
pub fn next_patch_version(current: &str) -> Option<String> {
    let mut version = semver::Version::parse(current.trim()).ok()?;
    version.patch += 1;
    version.pre = semver::Prerelease::EMPTY;
    version.build = semver::BuildMetadata::EMPTY;
    Some(version.to_string())
}

/// Copy the bundle aside, stamp the version and zip it.
///
/// The source directory is never modified.
fn staged_archive(source_dir: &NormalizedPath, version: Option<&str>) -> Result<Vec<u8>> {
    let staging = tempfile::Builder::new().prefix("flowsync-upload-").tempdir()?;
    let staged = NormalizedPath::new(staging.path()).join("bundle");
    tree::copy_dir(source_dir, &staged)?;
    if let Some(version) = version {
        manifest::stamp_version(&staged, version)?;
    }
    Ok(bundle::pack_dir(&staged)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1.0.0", Some("1.0.1"))]
    #[case("2.3.9", Some("2.3.10"))]
    #[case("1.0.0-beta", Some("1.0.1"))]
    #[case("Active", None)]
    #[case("", None)]
    fn patch_bump(#[case] current: &str, #[case] expected: Option<&str>) {
        assert_eq!(next_patch_version(current).as_deref(), expected);
    }

    #[test]
    fn endpoint_table() {
        let vm = KindEndpoints::for_kind(ArtifactKind::ValueMapping);
        assert_eq!(vm.entity_set, "ValueMappingDesigntimeArtifacts");
        assert_eq!(vm.deploy_function, "DeployValueMappingDesigntimeArtifact");
        assert_eq!(vm.update, UpdateStrategy::Recreate);

        let flow = KindEndpoints::for_kind(ArtifactKind::Integration);
        assert_eq!(flow.entity_set, "IntegrationDesigntimeArtifacts");
        assert_eq!(flow.update, UpdateStrategy::InPlace);
    }
}
