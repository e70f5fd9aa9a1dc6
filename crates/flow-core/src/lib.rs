//! Reconciliation engine for flowsync
//!
//! Sits above the content, git and API crates and decides, per artifact,
//! whether to create, update, write or skip:
//!
//! ```text
//!                  flow-cli
//!                     |
//!                 flow-core
//!                     |
//!     +--------+------+-------+---------+
//!     |        |              |         |
//!  flow-fs flow-content   flow-git  flow-api
//! ```
//!
//! # Example
//!
//! ```ignore
//! use flow_core::{SyncConfig, SyncEngine};
//!
//! let config = SyncConfig::new("OrderProcessing", repo_dir, work_dir);
//! let report = SyncEngine::new(client, config)?.run()?;
//! println!("{}", report.summary());
//! ```

pub mod config;
pub mod deploy;
pub mod engine;
pub mod error;
pub mod naming;
pub mod package;
pub mod report;
pub mod worker;

pub use config::{ArtifactFilter, CommitSettings, ConfigFile, DraftPolicy, NamingMode, SyncConfig, SyncDirection};
pub use deploy::{DeployOptions, deploy_artifacts};
pub use engine::{ArtifactUpload, SyncEngine, push_artifact, update_artifact};
pub use error::{Error, Result};
pub use package::{PackageChange, read_descriptor, update_package};
pub use report::{Action, ArtifactOutcome, SyncReport};
pub use worker::{CancelToken, run_jobs};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_failure_displays_id_and_cause() {
        let error = Error::ArtifactFailed {
            id: "Flow_A".to_string(),
            operation: "Upload".to_string(),
            source: Box::new(Error::validation("bad bundle")),
        };

        let display = error.to_string();
        assert!(display.contains("Flow_A"), "got: {display}");
        assert!(display.contains("bad bundle"), "got: {display}");
        assert!(matches!(error.root(), Error::Validation(_)));
    }
}
