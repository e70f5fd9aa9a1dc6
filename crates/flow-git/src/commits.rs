//! Committing working tree changes.

use chrono::{DateTime, TimeZone, Utc};
use flow_fs::NormalizedPath;
use git2::{Commit, ErrorCode, IndexAddOption, Repository, Signature};

use crate::{Error, Result};

/// Identity recorded as both author and committer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    pub email: String,
}

impl Author {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Information about a single commit.
#[derive(Debug, Clone)]
pub struct CommitInfo {
    /// Short commit hash (7 characters)
    pub hash: String,

    /// First line of the commit message
    pub message: String,

    /// Commit author name
    pub author: String,

    /// Commit timestamp
    pub timestamp: DateTime<Utc>,
}

impl CommitInfo {
    fn from_commit(commit: &Commit<'_>) -> Self {
        let dt: DateTime<Utc> = Utc
            .timestamp_opt(commit.time().seconds(), 0)
            .single()
            .unwrap_or_default();

        let message = commit
            .message()
            .unwrap_or("")
            .lines()
            .next()
            .unwrap_or("")
            .to_string();

        let author = commit.author();
        let author_name = author.name().unwrap_or("Unknown").to_string();

        Self {
            hash: format!("{:.7}", commit.id()),
            message,
            author: author_name,
            timestamp: dt,
        }
    }
}

/// Open the repository whose working tree is `repo_dir`.
pub fn open_repository(repo_dir: &NormalizedPath) -> Result<Repository> {
    Repository::open(repo_dir.to_native()).map_err(|e| match e.code() {
        ErrorCode::NotFound => Error::NotARepository {
            path: repo_dir.to_native(),
        },
        _ => Error::Git(e),
    })
}

/// Stage every change in the working tree and commit it.
///
/// Additions, modifications and deletions are all staged; ignored files
/// stay ignored. Returns `None` without creating a commit when the staged
/// tree equals `HEAD` (or is empty on an unborn branch).
pub fn commit_all(
    repo_dir: &NormalizedPath,
    message: &str,
    author: &Author,
) -> Result<Option<CommitInfo>> {
    let repo = open_repository(repo_dir)?;

    let mut index = repo.index()?;
    index.add_all(["*"].iter(), IndexAddOption::DEFAULT, None)?;
    index.update_all(["*"].iter(), None)?;
    index.write()?;
    let tree_id = index.write_tree()?;
    let tree = repo.find_tree(tree_id)?;

    let parent = match repo.head() {
        Ok(head) => Some(head.peel_to_commit()?),
        Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => None,
        Err(e) => return Err(e.into()),
    };

    let unchanged = match &parent {
        Some(parent) => parent.tree_id() == tree_id,
        None => tree.is_empty(),
    };
    if unchanged {
        tracing::info!(repo = %repo_dir, "No changes to commit");
        return Ok(None);
    }

    let signature = Signature::now(&author.name, &author.email)?;
    let parents: Vec<&Commit<'_>> = parent.iter().collect();
    let oid = repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)?;

    let info = CommitInfo::from_commit(&repo.find_commit(oid)?);
    tracing::info!(repo = %repo_dir, hash = %info.hash, "Committed changes");
    Ok(Some(info))
}
