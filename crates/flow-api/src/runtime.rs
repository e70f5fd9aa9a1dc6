//! Runtime artifact status

use crate::client::{ApiClient, expect_success, odata_key};
use crate::model::{Envelope, RuntimeStatus};
use crate::transport::Request;
use crate::Result;

#[derive(Clone)]
pub struct Runtime {
    client: ApiClient,
}

impl Runtime {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    fn runtime_path(id: &str) -> String {
        format!("/api/v1/IntegrationRuntimeArtifacts({})", odata_key(id))
    }

    /// Current deployment status; `None` when not deployed.
    pub fn get(&self, id: &str) -> Result<Option<RuntimeStatus>> {
        let response = self
            .client
            .send(Request::get(Self::runtime_path(id)).accept_json())?;
        if response.status == 404 {
            return Ok(None);
        }
        let response = expect_success(response, &format!("Get runtime status of '{id}'"))?;
        let entity: Envelope<RuntimeStatus> = response.json_body()?;
        Ok(Some(entity.d))
    }

    /// Deployment error details for an artifact in `ERROR` status.
    pub fn error_information(&self, id: &str) -> Result<Option<String>> {
        let path = format!("{}/ErrorInformation/$value", Self::runtime_path(id));
        let response = self.client.send(Request::get(path))?;
        if response.status == 404 || response.status == 204 {
            return Ok(None);
        }
        let response = expect_success(response, &format!("Get error information of '{id}'"))?;
        Ok(Some(response.text()))
    }
}
