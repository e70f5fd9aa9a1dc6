//! Sync settings
//!
//! [`SyncConfig`] is the fully resolved set of values one run works with.
//! The CLI builds it from flags, environment and an optional TOML file
//! (see [`file`]); [`SyncConfig::validate`] runs before any network call.

pub mod file;

pub use file::{ConfigFile, SyncSection, TenantSection};

use std::fmt;
use std::str::FromStr;

use flow_content::ReferenceRewriter;
use flow_fs::NormalizedPath;

use crate::{Error, Result};

pub const DEFAULT_COMMIT_MESSAGE: &str = "Sync repo from tenant";
pub const DEFAULT_COMMIT_USER: &str = "github-actions[bot]";
pub const DEFAULT_COMMIT_EMAIL: &str = "41898282+github-actions[bot]@users.noreply.github.com";

/// What to do with artifacts that only exist as unsaved drafts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DraftPolicy {
    #[default]
    Skip,
    Add,
    Error,
}

impl FromStr for DraftPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "SKIP" => Ok(Self::Skip),
            "ADD" => Ok(Self::Add),
            "ERROR" => Ok(Self::Error),
            _ => Err(Error::validation(format!(
                "invalid draft handling '{s}', allowed values are SKIP, ADD, ERROR"
            ))),
        }
    }
}

impl fmt::Display for DraftPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Skip => "SKIP",
            Self::Add => "ADD",
            Self::Error => "ERROR",
        })
    }
}

/// How local artifact directories are named.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamingMode {
    #[default]
    Id,
    Name,
}

impl FromStr for NamingMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "ID" => Ok(Self::Id),
            "NAME" => Ok(Self::Name),
            _ => Err(Error::validation(format!(
                "invalid directory naming type '{s}', allowed values are ID, NAME"
            ))),
        }
    }
}

impl fmt::Display for NamingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Id => "ID",
            Self::Name => "NAME",
        })
    }
}

/// Which side a sync writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncDirection {
    /// Pull: local tree updated from the tenant
    #[default]
    Local,
    /// Push: tenant updated from the local tree
    Remote,
}

impl FromStr for SyncDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "remote" => Ok(Self::Remote),
            _ => Err(Error::validation(format!(
                "invalid target '{s}', allowed values are local, remote"
            ))),
        }
    }
}

impl fmt::Display for SyncDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Local => "local",
            Self::Remote => "remote",
        })
    }
}

/// Artifact ids a run is restricted to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ArtifactFilter {
    #[default]
    All,
    Include(Vec<String>),
    Exclude(Vec<String>),
}

impl ArtifactFilter {
    /// Build a filter from optional include and exclude lists.
    ///
    /// Empty lists count as absent; giving both is an error.
    pub fn from_lists(include: Vec<String>, exclude: Vec<String>) -> Result<Self> {
        let include: Vec<String> = clean_ids(include);
        let exclude: Vec<String> = clean_ids(exclude);
        match (include.is_empty(), exclude.is_empty()) {
            (true, true) => Ok(Self::All),
            (false, true) => Ok(Self::Include(include)),
            (true, false) => Ok(Self::Exclude(exclude)),
            (false, false) => Err(Error::validation(
                "include and exclude lists are mutually exclusive",
            )),
        }
    }

    pub fn allows(&self, id: &str) -> bool {
        match self {
            Self::All => true,
            Self::Include(ids) => ids.iter().any(|i| i == id),
            Self::Exclude(ids) => !ids.iter().any(|i| i == id),
        }
    }
}

fn clean_ids(ids: Vec<String>) -> Vec<String> {
    ids.into_iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect()
}

/// Author and message of the commit made after a pull.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSettings {
    pub message: String,
    pub user: String,
    pub email: String,
    pub skip: bool,
}

impl Default for CommitSettings {
    fn default() -> Self {
        Self {
            message: DEFAULT_COMMIT_MESSAGE.to_string(),
            user: DEFAULT_COMMIT_USER.to_string(),
            email: DEFAULT_COMMIT_EMAIL.to_string(),
            skip: false,
        }
    }
}

/// Settings of one sync run.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub package_id: String,
    pub git_repo_dir: NormalizedPath,
    /// Defaults to the git repository directory
    pub artifacts_dir: NormalizedPath,
    pub work_dir: NormalizedPath,
    pub naming: NamingMode,
    pub draft_policy: DraftPolicy,
    pub filter: ArtifactFilter,
    pub direction: SyncDirection,
    pub commit: CommitSettings,
    /// `source:target` script collection id pairs
    pub script_collection_map: Vec<String>,
    pub sync_package_details: bool,
    /// Number of artifacts processed concurrently
    pub parallelism: usize,
}

impl SyncConfig {
    pub fn new(package_id: &str, git_repo_dir: NormalizedPath, work_dir: NormalizedPath) -> Self {
        Self {
            package_id: package_id.to_string(),
            artifacts_dir: git_repo_dir.clone(),
            git_repo_dir,
            work_dir,
            naming: NamingMode::default(),
            draft_policy: DraftPolicy::default(),
            filter: ArtifactFilter::default(),
            direction: SyncDirection::default(),
            commit: CommitSettings::default(),
            script_collection_map: Vec::new(),
            sync_package_details: false,
            parallelism: 1,
        }
    }

    pub fn with_artifacts_dir(mut self, artifacts_dir: NormalizedPath) -> Self {
        self.artifacts_dir = artifacts_dir;
        self
    }

    /// Check everything that can be checked without the tenant.
    pub fn validate(&self) -> Result<()> {
        if self.package_id.trim().is_empty() {
            return Err(Error::validation("package id is required"));
        }
        if self.parallelism == 0 {
            return Err(Error::validation("parallelism must be at least 1"));
        }
        let repo = self.git_repo_dir.absolutize()?;
        let artifacts = self.artifacts_dir.absolutize()?;
        if !artifacts.is_within(&repo) {
            return Err(Error::validation(format!(
                "artifacts directory {artifacts} must be inside the git repository {repo}"
            )));
        }
        self.rewriter()?;
        Ok(())
    }

    /// The reference rewriter described by `script_collection_map`.
    pub fn rewriter(&self) -> Result<ReferenceRewriter> {
        Ok(ReferenceRewriter::from_pairs(&self.script_collection_map)?)
    }
}
