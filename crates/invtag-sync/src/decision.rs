//! Per-record sync decisions.

use std::fmt;

use serde::Serialize;

/// Outcome of one record in one run. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncDecision {
    /// Record carries no usable identifier.
    SkipNoId,
    /// `only_missing` is set and the record already has tags.
    SkipFiltered,
    /// Inferred tags equal the existing ones, position by position.
    SkipUnchanged,
    /// Nothing survived inference.
    SkipEmpty,
    /// Tags were written (or would be, in dry-run).
    Update,
    /// The write was attempted and failed.
    UpdateFailed,
}

impl SyncDecision {
    pub const ALL: [SyncDecision; 6] = [
        SyncDecision::SkipNoId,
        SyncDecision::SkipFiltered,
        SyncDecision::SkipUnchanged,
        SyncDecision::SkipEmpty,
        SyncDecision::Update,
        SyncDecision::UpdateFailed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SyncDecision::SkipNoId => "skip-no-id",
            SyncDecision::SkipFiltered => "skip-filtered",
            SyncDecision::SkipUnchanged => "skip-unchanged",
            SyncDecision::SkipEmpty => "skip-empty",
            SyncDecision::Update => "update",
            SyncDecision::UpdateFailed => "update-failed",
        }
    }

    /// Whether the decision counts toward `updated` rather than `skipped`.
    pub fn counts_as_update(&self) -> bool {
        matches!(self, SyncDecision::Update)
    }
}

impl fmt::Display for SyncDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
