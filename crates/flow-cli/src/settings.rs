//! Merging of flags, environment and config file
//!
//! Flags and environment variables are resolved by clap; anything they
//! leave unset falls back to the config file, then to built-in defaults.

use std::sync::Arc;
use std::time::Duration;

use flow_api::http::DEFAULT_TIMEOUT;
use flow_api::{ApiClient, Credentials, ServiceDetails, UreqTransport};
use flow_core::config::{CommitSettings, TenantSection};
use flow_core::{ArtifactFilter, ConfigFile, SyncConfig};
use flow_fs::NormalizedPath;

use crate::cli::{ConnectionArgs, SyncArgs};
use crate::error::{CliError, Result};

const DEFAULT_CONFIG_FILE: &str = "flowsync.toml";
const DEFAULT_OAUTH_PATH: &str = "/oauth/token";

/// Load the config file named on the command line, or `./flowsync.toml`
/// when it exists.
pub fn load_config_file(explicit: Option<&str>) -> Result<ConfigFile> {
    match explicit {
        Some(path) => Ok(ConfigFile::load(&NormalizedPath::new(path))?),
        None => {
            let default = NormalizedPath::new(DEFAULT_CONFIG_FILE);
            if default.is_file() {
                Ok(ConfigFile::load(&default)?)
            } else {
                Ok(ConfigFile::default())
            }
        }
    }
}

fn pick(flag: &Option<String>, file: &Option<String>) -> Option<String> {
    flag.clone().or_else(|| file.clone()).filter(|v| !v.trim().is_empty())
}

fn require(value: Option<String>, flag: &str) -> Result<String> {
    value.ok_or_else(|| CliError::user(format!("missing required setting --{flag}")))
}

/// Tenant host and credentials.
///
/// OAuth is used when an OAuth host is configured, Basic otherwise.
pub fn service_details(args: &ConnectionArgs, file: &TenantSection) -> Result<ServiceDetails> {
    let host = require(pick(&args.tmn_host, &file.host), "tmn-host")?;
    let credentials = match pick(&args.oauth_host, &file.oauth_host) {
        Some(token_host) => Credentials::OAuth {
            token_host,
            token_path: pick(&args.oauth_path, &file.oauth_path)
                .unwrap_or_else(|| DEFAULT_OAUTH_PATH.to_string()),
            client_id: require(pick(&args.oauth_clientid, &file.oauth_client_id), "oauth-clientid")?,
            client_secret: require(
                pick(&args.oauth_clientsecret, &file.oauth_client_secret),
                "oauth-clientsecret",
            )?,
        },
        None => Credentials::Basic {
            user: require(pick(&args.tmn_userid, &file.user_id), "tmn-userid")?,
            password: require(pick(&args.tmn_password, &file.password), "tmn-password")?,
        },
    };
    Ok(ServiceDetails::new(host, credentials))
}

/// An [`ApiClient`] talking to the real tenant.
pub fn api_client(args: &ConnectionArgs, file: &TenantSection) -> Result<ApiClient> {
    let details = service_details(args, file)?;
    let timeout = args
        .timeout
        .or(file.timeout)
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_TIMEOUT);
    Ok(ApiClient::new(Arc::new(UreqTransport::new(details, timeout))))
}

/// Default scratch directory when none is configured.
pub fn default_work_dir() -> NormalizedPath {
    NormalizedPath::new(std::env::temp_dir().join("flowsync"))
}

/// Build the sync settings from `sync` flags and the `[sync]` section.
pub fn sync_config(args: &SyncArgs, file: &ConfigFile) -> Result<SyncConfig> {
    let section = &file.sync;
    let package_id = require(pick(&args.package_id, &section.package_id), "package-id")?;
    let repo = NormalizedPath::new(require(
        pick(&args.dir_git_repo, &section.dir_git_repo),
        "dir-git-repo",
    )?);
    let work = pick(&args.dir_work, &section.dir_work)
        .map(NormalizedPath::new)
        .unwrap_or_else(default_work_dir);

    let mut config = SyncConfig::new(&package_id, repo, work);
    if let Some(dir) = pick(&args.dir_artifacts, &section.dir_artifacts) {
        config.artifacts_dir = NormalizedPath::new(dir);
    }
    if let Some(naming) = pick(&args.dir_naming_type, &section.dir_naming_type) {
        config.naming = naming.parse()?;
    }
    if let Some(policy) = pick(&args.draft_handling, &section.draft_handling) {
        config.draft_policy = policy.parse()?;
    }
    if let Some(target) = pick(&args.target, &section.target) {
        config.direction = target.parse()?;
    }

    // Lists from the command line replace the file's lists as a pair
    config.filter = if args.ids_include.is_empty() && args.ids_exclude.is_empty() {
        ArtifactFilter::from_lists(section.ids_include.clone(), section.ids_exclude.clone())?
    } else {
        ArtifactFilter::from_lists(args.ids_include.clone(), args.ids_exclude.clone())?
    };
    config.script_collection_map = if args.script_collection_map.is_empty() {
        section.script_collection_map.clone()
    } else {
        args.script_collection_map.clone()
    };

    let defaults = CommitSettings::default();
    config.commit = CommitSettings {
        message: pick(&args.git_commit_msg, &section.git_commit_msg).unwrap_or(defaults.message),
        user: pick(&args.git_commit_user, &section.git_commit_user).unwrap_or(defaults.user),
        email: pick(&args.git_commit_email, &section.git_commit_email).unwrap_or(defaults.email),
        skip: args.git_skip_commit || section.git_skip_commit.unwrap_or(false),
    };
    config.sync_package_details =
        args.sync_package_details || section.sync_package_details.unwrap_or(false);
    config.parallelism = args.parallelism.or(section.parallelism).unwrap_or(1);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_core::{DraftPolicy, SyncDirection};

    fn file(content: &str) -> ConfigFile {
        ConfigFile::parse(content).unwrap()
    }

    #[test]
    fn flags_win_over_file() {
        let args = SyncArgs {
            package_id: Some("FromFlag".into()),
            dir_git_repo: Some("/repo".into()),
            ..SyncArgs::default()
        };
        let config = sync_config(
            &args,
            &file("[sync]\npackage_id = \"FromFile\"\ndraft_handling = \"error\"\ntarget = \"remote\"\n"),
        )
        .unwrap();

        assert_eq!(config.package_id, "FromFlag");
        assert_eq!(config.draft_policy, DraftPolicy::Error);
        assert_eq!(config.direction, SyncDirection::Remote);
        assert_eq!(config.artifacts_dir, NormalizedPath::new("/repo"));
    }

    #[test]
    fn missing_package_id_is_reported() {
        let args = SyncArgs {
            dir_git_repo: Some("/repo".into()),
            ..SyncArgs::default()
        };
        let err = sync_config(&args, &ConfigFile::default()).unwrap_err();
        assert!(err.to_string().contains("--package-id"), "{err}");
    }

    #[test]
    fn oauth_host_selects_oauth() {
        let args = ConnectionArgs {
            tmn_host: Some("tenant.example.com".into()),
            oauth_host: Some("auth.example.com".into()),
            oauth_clientid: Some("id".into()),
            oauth_clientsecret: Some("secret".into()),
            ..ConnectionArgs::default()
        };
        let details = service_details(&args, &TenantSection::default()).unwrap();
        assert_eq!(
            details.credentials.token_url().as_deref(),
            Some("https://auth.example.com/oauth/token")
        );
    }

    #[test]
    fn basic_auth_needs_password() {
        let args = ConnectionArgs {
            tmn_host: Some("tenant.example.com".into()),
            tmn_userid: Some("user".into()),
            ..ConnectionArgs::default()
        };
        let err = service_details(&args, &TenantSection::default()).unwrap_err();
        assert!(err.to_string().contains("--tmn-password"), "{err}");
    }
}
