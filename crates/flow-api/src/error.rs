//! Error types for flow-api

/// Result type for flow-api operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur talking to the remote management API
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{what} not found")]
    NotFound { what: String },

    #[error("{what} already exists")]
    Conflict { what: String },

    #[error("Transport failure for {url}: {message}")]
    Transport {
        url: String,
        message: String,
        timeout: bool,
    },

    #[error("{operation} failed with HTTP {status}: {body}")]
    Server {
        operation: String,
        status: u16,
        body: String,
    },

    #[error("Unexpected response payload: {0}")]
    Decode(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Content(#[from] flow_content::Error),

    #[error(transparent)]
    Fs(#[from] flow_fs::Error),
}

impl Error {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport { timeout: true, .. })
    }
}
