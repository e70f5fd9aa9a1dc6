//! Reconciliation engine
//!
//! [`SyncEngine`] brings one integration package and one local directory
//! tree into agreement, in the direction the config names:
//!
//! - **pull** (`local`): download every selected artifact, write those whose
//!   content differs and commit the result to git
//! - **push** (`remote`): create artifacts the tenant lacks and update those
//!   whose content differs
//!
//! Per-artifact work runs through [`run_jobs`](crate::worker::run_jobs); the
//! first failure stops the run.

mod pull;
mod push;

pub use push::{ArtifactUpload, push_artifact, update_artifact};

use flow_api::ApiClient;

use crate::config::{SyncConfig, SyncDirection};
use crate::report::SyncReport;
use crate::worker::CancelToken;
use crate::{Error, Result};

/// Engine for one sync run
pub struct SyncEngine {
    client: ApiClient,
    config: SyncConfig,
    cancel: CancelToken,
}

impl SyncEngine {
    /// Create an engine after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for settings that cannot work, before
    /// anything is sent to the tenant.
    pub fn new(client: ApiClient, config: SyncConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            client,
            config,
            cancel: CancelToken::new(),
        })
    }

    /// Share a stop flag with the caller, e.g. an interrupt handler.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Run in the configured direction.
    pub fn run(&self) -> Result<SyncReport> {
        tracing::info!(
            package = %self.config.package_id,
            direction = %self.config.direction,
            "Starting sync"
        );
        let report = match self.config.direction {
            SyncDirection::Local => self.pull()?,
            SyncDirection::Remote => self.push()?,
        };
        tracing::info!(summary = %report.summary(), "Sync finished");
        Ok(report)
    }

    fn package_not_found(&self, hint: &str) -> Error {
        Error::PackageNotFound {
            id: self.config.package_id.clone(),
            hint: hint.to_string(),
        }
    }
}
