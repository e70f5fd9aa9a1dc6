//! Git adapter for flowsync
//!
//! After a pull run the artifacts directory is committed as a whole. The
//! adapter stages every change under the repository, deletions included,
//! and commits with an explicit author so CI runners need no git config.

pub mod commits;
pub mod error;

pub use commits::{Author, CommitInfo, commit_all, open_repository};
pub use error::{Error, Result};
