//! Git repository fixtures.

use std::path::Path;

/// Initialises a real git repository using `git2` (no initial commit, no config).
///
/// Realism level: **REAL**, valid git object store, empty history.
///
/// # Panics
/// Panics if `git2::Repository::init` fails.
pub fn real_git_repo(path: &Path) -> git2::Repository {
    git2::Repository::init(path).unwrap_or_else(|e| {
        panic!(
            "real_git_repo: failed to init repository at {}: {e}",
            path.display()
        )
    })
}

/// Number of commits reachable from `HEAD`; zero for an unborn branch.
///
/// # Panics
/// Panics if the repository cannot be opened or walked.
pub fn commit_count(path: &Path) -> usize {
    let repo = git2::Repository::open(path)
        .unwrap_or_else(|e| panic!("commit_count: failed to open {}: {e}", path.display()));
    let head = match repo.head() {
        Ok(head) => head,
        Err(_) => return 0,
    };
    let oid = head
        .target()
        .unwrap_or_else(|| panic!("commit_count: HEAD has no target"));
    let mut revwalk = repo.revwalk().expect("commit_count: revwalk");
    revwalk.push(oid).expect("commit_count: push HEAD");
    revwalk.count()
}

/// First line of the `HEAD` commit message and its author name and email.
///
/// # Panics
/// Panics if there is no `HEAD` commit.
pub fn head_commit(path: &Path) -> (String, String, String) {
    let repo = git2::Repository::open(path)
        .unwrap_or_else(|e| panic!("head_commit: failed to open {}: {e}", path.display()));
    let commit = repo
        .head()
        .and_then(|h| h.peel_to_commit())
        .unwrap_or_else(|e| panic!("head_commit: no HEAD commit: {e}"));
    let author = commit.author();
    (
        commit.summary().unwrap_or("").to_string(),
        author.name().unwrap_or("").to_string(),
        author.email().unwrap_or("").to_string(),
    )
}
