//! Run report: counts, per-decision tallies, changes and failures.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

use invtag_core::StoreError;

use crate::decision::SyncDecision;

/// A record whose tags differ from inference output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordChange {
    pub item_id: String,
    pub old: Vec<String>,
    pub new: Vec<String>,
    /// False in dry-run and when the write failed.
    pub applied: bool,
}

impl RecordChange {
    /// Tags in `new` that are not in `old`.
    pub fn added(&self) -> Vec<&str> {
        self.new
            .iter()
            .filter(|t| !self.old.contains(t))
            .map(String::as_str)
            .collect()
    }

    /// Tags in `old` that are not in `new`.
    pub fn removed(&self) -> Vec<&str> {
        self.old
            .iter()
            .filter(|t| !self.new.contains(t))
            .map(String::as_str)
            .collect()
    }
}

/// A patch that failed. The run continued past it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordFailure {
    pub item_id: String,
    #[serde(serialize_with = "serialize_error")]
    pub error: StoreError,
}

fn serialize_error<S: Serializer>(error: &StoreError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// Result of one record, before reduction into the report.
#[derive(Debug, Clone)]
pub(crate) enum RecordOutcome {
    NotStarted,
    Done {
        decision: SyncDecision,
        change: Option<RecordChange>,
        failure: Option<RecordFailure>,
    },
}

/// Summary of a completed (possibly cancelled) run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncReport {
    pub dry_run: bool,
    /// Records returned by the listing.
    pub loaded: usize,
    /// Writes performed, or that would have been performed in dry-run.
    pub updated: usize,
    /// Every other processed record, failed writes included.
    pub skipped: usize,
    /// Records left untouched because the run was cancelled.
    pub not_started: usize,
    /// Cancellation cut the run short.
    pub cancelled: bool,
    pub decisions: BTreeMap<SyncDecision, usize>,
    pub changes: Vec<RecordChange>,
    pub failures: Vec<RecordFailure>,
}

impl SyncReport {
    pub(crate) fn new(dry_run: bool, loaded: usize) -> Self {
        Self {
            dry_run,
            loaded,
            ..Self::default()
        }
    }

    pub(crate) fn record(&mut self, outcome: RecordOutcome) {
        match outcome {
            RecordOutcome::NotStarted => self.not_started += 1,
            RecordOutcome::Done {
                decision,
                change,
                failure,
            } => {
                if decision.counts_as_update() {
                    self.updated += 1;
                } else {
                    self.skipped += 1;
                }
                *self.decisions.entry(decision).or_insert(0) += 1;
                self.changes.extend(change);
                self.failures.extend(failure);
            }
        }
    }

    /// Number of records that ended with `decision`.
    pub fn count(&self, decision: SyncDecision) -> usize {
        self.decisions.get(&decision).copied().unwrap_or(0)
    }

    /// Failure for `item_id`, if its write failed.
    pub fn failure_for(&self, item_id: &str) -> Option<&RecordFailure> {
        self.failures.iter().find(|f| f.item_id == item_id)
    }

    pub fn mode_label(&self) -> &'static str {
        if self.dry_run {
            "DRY RUN"
        } else {
            "APPLY"
        }
    }

    /// `[DRY RUN] Updated: N | Skipped: M` or `[APPLY] ...`.
    pub fn summary_line(&self) -> String {
        format!(
            "[{}] Updated: {} | Skipped: {}",
            self.mode_label(),
            self.updated,
            self.skipped
        )
    }
}
