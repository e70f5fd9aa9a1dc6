//! CLI argument parsing using clap derive

use clap::{Args, Parser, Subcommand};

/// flowsync - Synchronise integration artifacts between a tenant and git
#[derive(Parser, Debug)]
#[command(name = "flowsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true, env = "FLOWSYNC_DEBUG")]
    pub debug: bool,

    /// Config file with default settings (defaults to ./flowsync.toml if present)
    #[arg(long, global = true, env = "FLOWSYNC_CONFIG")]
    pub config: Option<String>,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Tenant connection flags, shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Tenant management host
    #[arg(long, global = true, env = "FLOWSYNC_TMN_HOST")]
    pub tmn_host: Option<String>,

    /// User for Basic authentication
    #[arg(long, global = true, env = "FLOWSYNC_TMN_USERID")]
    pub tmn_userid: Option<String>,

    /// Password for Basic authentication
    #[arg(long, global = true, env = "FLOWSYNC_TMN_PASSWORD", hide_env_values = true)]
    pub tmn_password: Option<String>,

    /// Host of the OAuth token endpoint; switches to OAuth authentication
    #[arg(long, global = true, env = "FLOWSYNC_OAUTH_HOST")]
    pub oauth_host: Option<String>,

    #[arg(long, global = true, env = "FLOWSYNC_OAUTH_CLIENTID")]
    pub oauth_clientid: Option<String>,

    #[arg(long, global = true, env = "FLOWSYNC_OAUTH_CLIENTSECRET", hide_env_values = true)]
    pub oauth_clientsecret: Option<String>,

    /// Path of the OAuth token endpoint
    #[arg(long, global = true, env = "FLOWSYNC_OAUTH_PATH")]
    pub oauth_path: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, env = "FLOWSYNC_TIMEOUT")]
    pub timeout: Option<u64>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Synchronise an integration package with a git working tree
    ///
    /// Examples:
    ///   flowsync sync --package-id Orders --dir-git-repo .
    ///   flowsync sync --package-id Orders --dir-git-repo . --target remote
    Sync(SyncArgs),

    /// Create or update an artifact or a package on the tenant
    Update {
        #[command(subcommand)]
        target: UpdateTarget,
    },

    /// Deploy artifacts and wait until they have started
    Deploy(DeployArgs),
}

#[derive(Subcommand, Debug)]
pub enum UpdateTarget {
    /// Create or update one designtime artifact from a local directory
    Artifact(UpdateArtifactArgs),
    /// Create or update an integration package from a JSON descriptor
    Package(UpdatePackageArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct SyncArgs {
    /// Integration package to synchronise
    #[arg(long, env = "FLOWSYNC_PACKAGE_ID")]
    pub package_id: Option<String>,

    /// Root of the git working tree
    #[arg(long, env = "FLOWSYNC_DIR_GIT_REPO")]
    pub dir_git_repo: Option<String>,

    /// Directory holding the artifacts (defaults to the git repository)
    #[arg(long, env = "FLOWSYNC_DIR_ARTIFACTS")]
    pub dir_artifacts: Option<String>,

    /// Scratch directory for downloads
    #[arg(long, env = "FLOWSYNC_DIR_WORK")]
    pub dir_work: Option<String>,

    /// Name artifact directories by ID or NAME
    #[arg(long, env = "FLOWSYNC_DIR_NAMING_TYPE")]
    pub dir_naming_type: Option<String>,

    /// What to do with draft artifacts: SKIP, ADD or ERROR
    #[arg(long, env = "FLOWSYNC_DRAFT_HANDLING")]
    pub draft_handling: Option<String>,

    /// Only sync these artifact ids (comma separated)
    #[arg(long, value_delimiter = ',', conflicts_with = "ids_exclude")]
    pub ids_include: Vec<String>,

    /// Sync everything except these artifact ids (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub ids_exclude: Vec<String>,

    /// Side to update: local or remote
    #[arg(long, env = "FLOWSYNC_TARGET")]
    pub target: Option<String>,

    #[arg(long, env = "FLOWSYNC_GIT_COMMIT_MSG")]
    pub git_commit_msg: Option<String>,

    #[arg(long, env = "FLOWSYNC_GIT_COMMIT_USER")]
    pub git_commit_user: Option<String>,

    #[arg(long, env = "FLOWSYNC_GIT_COMMIT_EMAIL")]
    pub git_commit_email: Option<String>,

    /// Script collection id mapping applied to pulled flows (source:target, comma separated)
    #[arg(long, value_delimiter = ',')]
    pub script_collection_map: Vec<String>,

    /// Do not commit after pulling
    #[arg(long)]
    pub git_skip_commit: bool,

    /// Also write the package descriptor next to the artifacts
    #[arg(long)]
    pub sync_package_details: bool,

    /// Artifacts processed concurrently
    #[arg(long, env = "FLOWSYNC_PARALLELISM")]
    pub parallelism: Option<usize>,
}

#[derive(Args, Debug, Clone)]
pub struct UpdateArtifactArgs {
    #[arg(long)]
    pub artifact_id: String,

    /// Display name (defaults to the id)
    #[arg(long)]
    pub artifact_name: Option<String>,

    #[arg(long)]
    pub package_id: String,

    /// Directory of the unpacked artifact
    #[arg(long)]
    pub dir_artifact: String,

    #[arg(long, env = "FLOWSYNC_DIR_WORK")]
    pub dir_work: Option<String>,

    /// Integration, MessageMapping, ScriptCollection or ValueMapping
    #[arg(long, default_value = "Integration")]
    pub artifact_type: String,
}

#[derive(Args, Debug, Clone)]
pub struct UpdatePackageArgs {
    /// JSON descriptor, either `{"d": {...}}` or a bare object
    #[arg(long)]
    pub package_file: String,
}

#[derive(Args, Debug, Clone)]
pub struct DeployArgs {
    /// Artifact ids to deploy (comma separated)
    #[arg(long, value_delimiter = ',', required = true)]
    pub artifact_ids: Vec<String>,

    #[arg(long, default_value = "Integration")]
    pub artifact_type: String,

    /// Seconds to wait before each status check
    #[arg(long, default_value_t = 30)]
    pub delay_length: u64,

    /// Status checks before giving up
    #[arg(long, default_value_t = 10)]
    pub max_check_limit: u32,
}
