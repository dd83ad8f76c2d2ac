//! Error types for invtag.
//!
//! Two families live here. [`Error`] covers local failures (configuration,
//! vocabulary files, serialization). [`StoreError`] covers calls to the remote
//! record store and is what the sync driver sorts into fatal versus per-record.

use thiserror::Error;

/// Result type alias using invtag's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for local invtag operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration value missing or malformed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Vocabulary data would break canonicalization guarantees
    #[error("Vocabulary error: {0}")]
    Vocabulary(String),

    /// A pattern rule failed to compile
    #[error("Invalid rule pattern {pattern:?} for tag {tag:?}: {reason}")]
    InvalidRule {
        pattern: String,
        tag: String,
        reason: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

/// Failure of a single call to the remote record store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The request never produced a response (timeout, refused, DNS).
    #[error("Request error: {0}")]
    Transport(String),

    /// The store answered with a non-2xx status.
    #[error("Store returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The store answered 2xx but the body was not what we expected.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The call never completed because the task running it failed.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Whether a caller may reasonably retry the same call later.
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::Transport(_) => true,
            StoreError::Status { status, .. } => {
                *status == 408 || *status == 429 || (500..600).contains(status)
            }
            StoreError::InvalidResponse(_) | StoreError::Internal(_) => false,
        }
    }

    /// HTTP status carried by the error, if the store answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            StoreError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
