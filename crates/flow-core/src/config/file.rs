//! `flowsync.toml` parsing
//!
//! The file supplies defaults for connection and sync settings. Every value
//! is optional; command-line flags take precedence over anything read here.
//!
//! ```toml
//! [tenant]
//! host = "tenant.it-cpi001.cfapps.eu10.hana.ondemand.com"
//! oauth_host = "tenant.authentication.eu10.hana.ondemand.com"
//! oauth_client_id = "sb-client"
//!
//! [sync]
//! package_id = "OrderProcessing"
//! dir_artifacts = "artifacts"
//! draft_handling = "ERROR"
//! script_collection_map = ["Common_Scripts:Common_Scripts_QA"]
//! ```

use serde::{Deserialize, Serialize};

use flow_fs::{NormalizedPath, io};

use crate::Result;

/// Connection settings section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TenantSection {
    pub host: Option<String>,
    pub user_id: Option<String>,
    pub password: Option<String>,
    pub oauth_host: Option<String>,
    pub oauth_client_id: Option<String>,
    pub oauth_client_secret: Option<String>,
    pub oauth_path: Option<String>,
    /// Request timeout in seconds
    pub timeout: Option<u64>,
}

/// Sync settings section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncSection {
    pub package_id: Option<String>,
    pub dir_git_repo: Option<String>,
    pub dir_artifacts: Option<String>,
    pub dir_work: Option<String>,
    pub dir_naming_type: Option<String>,
    pub draft_handling: Option<String>,
    #[serde(default)]
    pub ids_include: Vec<String>,
    #[serde(default)]
    pub ids_exclude: Vec<String>,
    pub target: Option<String>,
    pub git_commit_msg: Option<String>,
    pub git_commit_user: Option<String>,
    pub git_commit_email: Option<String>,
    pub git_skip_commit: Option<bool>,
    #[serde(default)]
    pub script_collection_map: Vec<String>,
    pub sync_package_details: Option<bool>,
    pub parallelism: Option<usize>,
}

/// Parsed `flowsync.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub tenant: TenantSection,
    #[serde(default)]
    pub sync: SyncSection,
}

impl ConfigFile {
    /// Parse TOML content.
    ///
    /// # Example
    ///
    /// ```
    /// use flow_core::config::ConfigFile;
    ///
    /// let file = ConfigFile::parse(r#"
    /// [sync]
    /// package_id = "Pkg"
    /// parallelism = 4
    /// "#).unwrap();
    ///
    /// assert_eq!(file.sync.package_id.as_deref(), Some("Pkg"));
    /// assert_eq!(file.sync.parallelism, Some(4));
    /// ```
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &NormalizedPath) -> Result<Self> {
        tracing::debug!(path = %path, "Loading config file");
        Self::parse(&io::read_text(path)?)
    }
}
