//! Integration package endpoints

use flow_content::ArtifactKind;

use crate::client::{ApiClient, expect_success, odata_key};
use crate::designtime::KindEndpoints;
use crate::model::{Artifact, ArtifactEntity, Envelope, Package, PackageDescriptor, Results};
use crate::transport::Request;
use crate::{Error, Result};

#[derive(Clone)]
pub struct Packages {
    client: ApiClient,
}

impl Packages {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    fn package_path(id: &str) -> String {
        format!("/api/v1/IntegrationPackages({})", odata_key(id))
    }

    /// Fetch a package; `None` when it does not exist.
    pub fn get(&self, id: &str) -> Result<Option<Package>> {
        let response = self
            .client
            .send(Request::get(Self::package_path(id)).accept_json())?;
        if response.status == 404 {
            return Ok(None);
        }
        let response = expect_success(response, &format!("Get package '{id}'"))?;
        let raw: serde_json::Value = response.json_body()?;
        let envelope: Envelope<PackageDescriptor> = serde_json::from_value(raw.clone())
            .map_err(|e| Error::Decode(format!("package '{id}': {e}")))?;
        Ok(Some(Package {
            descriptor: envelope.d,
            raw,
        }))
    }

    pub fn create(&self, descriptor: &PackageDescriptor) -> Result<()> {
        tracing::info!(package = %descriptor.id, "Creating integration package");
        let request = Request::post("/api/v1/IntegrationPackages").json(descriptor)?;
        let response = self.client.send(request)?;
        if response.status == 409 {
            return Err(Error::Conflict {
                what: format!("package '{}'", descriptor.id),
            });
        }
        expect_success(response, &format!("Create package '{}'", descriptor.id))?;
        Ok(())
    }

    pub fn update(&self, descriptor: &PackageDescriptor) -> Result<()> {
        tracing::info!(package = %descriptor.id, "Updating integration package");
        let request = Request::put(Self::package_path(&descriptor.id)).json(descriptor)?;
        let response = self.client.send(request)?;
        if response.status == 404 {
            return Err(Error::not_found(format!("package '{}'", descriptor.id)));
        }
        expect_success(response, &format!("Update package '{}'", descriptor.id))?;
        Ok(())
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        tracing::info!(package = %id, "Deleting integration package");
        let response = self.client.send(Request::delete(Self::package_path(id)))?;
        if response.status == 404 {
            return Err(Error::not_found(format!("package '{id}'")));
        }
        expect_success(response, &format!("Delete package '{id}'"))?;
        Ok(())
    }

    /// Artifacts of one kind contained in a package.
    pub fn list_artifacts(&self, package_id: &str, kind: ArtifactKind) -> Result<Vec<Artifact>> {
        let path = format!(
            "{}/{}",
            Self::package_path(package_id),
            KindEndpoints::for_kind(kind).entity_set
        );
        let response = self.client.send(Request::get(path).accept_json())?;
        if response.status == 404 {
            return Err(Error::not_found(format!("package '{package_id}'")));
        }
        let response = expect_success(response, &format!("List {kind} artifacts of '{package_id}'"))?;
        let list: Envelope<Results<ArtifactEntity>> = response.json_body()?;
        Ok(list
            .d
            .results
            .into_iter()
            .map(|entity| Artifact::from_entity(entity, kind))
            .collect())
    }

    /// Artifacts of every kind, in kind order.
    pub fn list_all_artifacts(&self, package_id: &str) -> Result<Vec<Artifact>> {
        let mut all = Vec::new();
        for kind in ArtifactKind::ALL {
            all.extend(self.list_artifacts(package_id, kind)?);
        }
        Ok(all)
    }
}
