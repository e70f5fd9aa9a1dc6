//! Error types for flow-content

use std::path::PathBuf;

/// Result type for flow-content operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in flow-content operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Bundle at {path} has no META-INF/MANIFEST.MF")]
    MissingManifest { path: PathBuf },

    #[error("Invalid manifest: {message}")]
    InvalidManifest { message: String },

    #[error("Unknown artifact type: {0}")]
    UnknownKind(String),

    #[error("Archive entry escapes the bundle root: {path}")]
    PathTraversal { path: String },

    #[error("Invalid script collection mapping '{entry}': {reason}")]
    InvalidMapping { entry: String, reason: String },

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error(transparent)]
    Fs(#[from] flow_fs::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn manifest(message: impl Into<String>) -> Self {
        Self::InvalidManifest {
            message: message.into(),
        }
    }
}
