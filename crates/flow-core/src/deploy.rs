//! Deploy and wait for runtime start

use std::thread;
use std::time::Duration;

use flow_api::{ApiClient, RuntimeStatus};
use flow_content::ArtifactKind;

use crate::worker::CancelToken;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOptions {
    /// Wait before each runtime status check
    pub delay: Duration,
    /// Status checks before giving up
    pub max_checks: u32,
}

impl Default for DeployOptions {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(30),
            max_checks: 10,
        }
    }
}

/// Deploy each artifact in turn and wait until it has started.
///
/// Deployment is asynchronous on the tenant, so after triggering it the
/// runtime status is checked every `delay` until it starts with `START`
/// and is not `STARTING`. An `ERROR` status fails with the tenant's error
/// information.
pub fn deploy_artifacts(
    client: &ApiClient,
    kind: ArtifactKind,
    ids: &[String],
    options: &DeployOptions,
    cancel: &CancelToken,
) -> Result<Vec<RuntimeStatus>> {
    let designtime = client.designtime(kind);
    let mut started = Vec::with_capacity(ids.len());
    for id in ids {
        cancel.check()?;
        designtime.deploy(id)?;
        started.push(wait_for_start(client, id, options, cancel)?);
    }
    Ok(started)
}

fn wait_for_start(
    client: &ApiClient,
    id: &str,
    options: &DeployOptions,
    cancel: &CancelToken,
) -> Result<RuntimeStatus> {
    let runtime = client.runtime();
    for check in 1..=options.max_checks {
        thread::sleep(options.delay);
        cancel.check()?;

        let Some(status) = runtime.get(id)? else {
            tracing::info!(id, check, "Runtime artifact not available yet");
            continue;
        };
        tracing::info!(id, check, status = %status.status, "Checked deployment status");

        if status.is_error() {
            let details = runtime
                .error_information(id)?
                .unwrap_or_else(|| "no error information available".to_string());
            return Err(Error::DeployFailed {
                id: id.to_string(),
                status: status.status,
                details,
            });
        }
        if status.is_started() && status.status != "STARTING" {
            tracing::info!(id, version = %status.version, "Artifact started");
            return Ok(status);
        }
    }
    Err(Error::DeployTimeout {
        id: id.to_string(),
        checks: options.max_checks,
    })
}
