use thiserror::Error;

/// Main error type for holder operations
#[derive(Error, Debug)]
pub enum HolderError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Malformed URL parameter '{name}': {reason}")]
    MalformedParam { name: String, reason: String },

    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("History unavailable: {0}")]
    HistoryUnavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for holder operations
pub type Result<T> = std::result::Result<T, HolderError>;

impl HolderError {
    /// Check if this error should be surfaced to the renderer rather than
    /// propagated to the caller
    ///
    /// Transport failures never block the UI: they are logged, shown as a
    /// recoverable error state, and the session keeps accepting actions.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            HolderError::Transport(_)
                | HolderError::MalformedParam { .. }
                | HolderError::HistoryUnavailable(_)
        )
    }
}
