//! Error types for flow-core

/// Result type for flow-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in flow-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Settings rejected before any network call
    #[error("Invalid configuration: {0}")]
    Validation(String),

    /// A draft was found while the draft policy is ERROR
    #[error("Artifact '{id}' is in draft state; save it in the tenant before syncing")]
    DraftConflict { id: String },

    #[error("Integration package '{id}' does not exist{hint}")]
    PackageNotFound { id: String, hint: String },

    /// First failure of a per-artifact job
    #[error("{operation} of artifact '{id}' failed: {source}")]
    ArtifactFailed {
        id: String,
        operation: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Run cancelled")]
    Cancelled,

    #[error("Deployment of '{id}' ended in status {status}: {details}")]
    DeployFailed {
        id: String,
        status: String,
        details: String,
    },

    #[error("Deployment of '{id}' did not start after {checks} status checks")]
    DeployTimeout { id: String, checks: u32 },

    // Transparent wrappers for underlying crate errors
    #[error(transparent)]
    Fs(#[from] flow_fs::Error),

    #[error(transparent)]
    Content(#[from] flow_content::Error),

    #[error(transparent)]
    Git(#[from] flow_git::Error),

    #[error(transparent)]
    Api(#[from] flow_api::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn artifact(id: &str, operation: &str, source: Error) -> Self {
        Self::ArtifactFailed {
            id: id.to_string(),
            operation: operation.to_string(),
            source: Box::new(source),
        }
    }

    /// The innermost error below any `ArtifactFailed` wrappers.
    pub fn root(&self) -> &Error {
        match self {
            Self::ArtifactFailed { source, .. } => source.root(),
            other => other,
        }
    }
}
