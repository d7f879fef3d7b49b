use std::path::PathBuf;
use thiserror::Error;

/// Failures of the record store.
///
/// This is the only error surface the core lets through to callers; egress
/// logging swallows it.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No user identity was available for an operation that requires one
    #[error("unauthenticated: sign in or pass --user to store results")]
    Unauthenticated,

    /// The backing storage could not be reached, read or written
    #[error("store unavailable: {message}")]
    Unavailable {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Stored data exists but cannot be understood
    #[error("store data is corrupt: {0}")]
    Corrupt(String),

    #[error("result not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
            path: None,
            source: None,
        }
    }

    pub fn io(message: impl Into<String>, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Unavailable {
            message: message.into(),
            path: Some(path.into()),
            source: Some(source),
        }
    }
}
