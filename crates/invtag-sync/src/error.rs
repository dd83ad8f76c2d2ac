//! Fatal sync errors.
//!
//! Only failures that abort a whole run live here. A failed patch of a single
//! record is reported as a [`crate::RecordFailure`] in the run report instead.

use thiserror::Error;

use invtag_core::StoreError;

/// Errors that abort a sync run before any record is processed.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The listing call failed or returned something that is not an item collection.
    #[error("Failed to load inventory: {0}")]
    Fetch(#[source] StoreError),

    /// Cancelled before the listing completed.
    #[error("Sync cancelled before inventory was loaded")]
    Cancelled,
}

impl SyncError {
    /// Whether retrying the whole run may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Fetch(e) => e.is_retryable(),
            SyncError::Cancelled => false,
        }
    }
}

/// Result alias for sync runs.
pub type Result<T> = std::result::Result<T, SyncError>;
