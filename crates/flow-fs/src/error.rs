//! Error types for flow-fs

use std::path::PathBuf;

/// Result type for flow-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in flow-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("Invalid path {path}: {reason}")]
    InvalidPath { path: PathBuf, reason: String },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
