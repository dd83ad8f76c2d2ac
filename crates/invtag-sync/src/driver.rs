//! The read-compare-write loop.
//!
//! A run lists up to `limit` records, plans each one with the inferencer and
//! patches the records whose inferred tags differ from what the store holds.
//! The listing always completes before any record is planned. With
//! `concurrency > 1` records are processed on a [`JoinSet`] bounded by a
//! [`Semaphore`]; outcomes are reduced into the report after the join, in
//! listing order.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use invtag_core::defaults::{LIST_LIMIT, SYNC_CONCURRENCY, SYNC_CONCURRENCY_MAX};
use invtag_core::{Record, RecordStore, StoreError, TagInferencer, TagSet};

use crate::decision::SyncDecision;
use crate::error::{Result, SyncError};
use crate::report::{RecordChange, RecordFailure, RecordOutcome, SyncReport};

/// Options for one sync run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Maximum number of records to list.
    pub limit: usize,
    /// Compute and report decisions without writing.
    pub dry_run: bool,
    /// Only touch records that have no tags yet.
    pub only_missing: bool,
    /// Records processed in parallel; 1 is sequential.
    pub concurrency: usize,
    /// Stop starting new records after this long.
    pub deadline: Option<Duration>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            limit: LIST_LIMIT,
            dry_run: false,
            only_missing: false,
            concurrency: SYNC_CONCURRENCY,
            deadline: None,
        }
    }
}

impl SyncOptions {
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_only_missing(mut self, only_missing: bool) -> Self {
        self.only_missing = only_missing;
        self
    }

    /// Clamped to `1..=SYNC_CONCURRENCY_MAX`.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.clamp(1, SYNC_CONCURRENCY_MAX);
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Decision for one record, before any write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordPlan {
    pub item_id: Option<String>,
    pub decision: SyncDecision,
    pub old: Vec<String>,
    /// Empty unless inference ran.
    pub new: TagSet,
}

impl RecordPlan {
    fn skip(record: &Record, decision: SyncDecision) -> Self {
        Self {
            item_id: record.id().map(str::to_string),
            decision,
            old: record.tags.clone(),
            new: TagSet::default(),
        }
    }
}

/// Reconciles inferred tags against a [`RecordStore`].
pub struct SyncDriver<S: ?Sized> {
    store: Arc<S>,
    inferencer: Arc<TagInferencer>,
}

impl<S: ?Sized> Clone for SyncDriver<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            inferencer: Arc::clone(&self.inferencer),
        }
    }
}

impl<S> SyncDriver<S>
where
    S: RecordStore + ?Sized + 'static,
{
    pub fn new(store: Arc<S>, inferencer: Arc<TagInferencer>) -> Self {
        Self { store, inferencer }
    }

    pub fn inferencer(&self) -> &TagInferencer {
        &self.inferencer
    }

    /// Decide what to do with `record`. Pure; performs no I/O.
    pub fn plan(&self, record: &Record, only_missing: bool) -> RecordPlan {
        let Some(item_id) = record.id() else {
            return RecordPlan::skip(record, SyncDecision::SkipNoId);
        };

        if only_missing && record.has_tags() {
            return RecordPlan::skip(record, SyncDecision::SkipFiltered);
        }

        let new = self.inferencer.infer_tags(record);

        let decision = if new.matches(&record.tags) {
            SyncDecision::SkipUnchanged
        } else if new.is_empty() {
            SyncDecision::SkipEmpty
        } else {
            SyncDecision::Update
        };

        RecordPlan {
            item_id: Some(item_id.to_string()),
            decision,
            old: record.tags.clone(),
            new,
        }
    }

    /// Run once with no external cancellation.
    pub async fn run(&self, options: &SyncOptions) -> Result<SyncReport> {
        self.run_with_cancel(options, CancellationToken::new()).await
    }

    /// Run once, stopping early when `cancel` fires or the deadline passes.
    ///
    /// Cancellation during the listing is [`SyncError::Cancelled`]. After the
    /// listing, records not yet started are counted in
    /// [`SyncReport::not_started`]; writes already issued finish normally.
    pub async fn run_with_cancel(
        &self,
        options: &SyncOptions,
        cancel: CancellationToken,
    ) -> Result<SyncReport> {
        let start = Instant::now();
        let token = cancel.child_token();
        let deadline_timer = options.deadline.map(|deadline| {
            let token = token.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = tokio::time::sleep(deadline) => {
                        warn!(deadline_ms = deadline.as_millis() as u64, "Sync deadline reached");
                        token.cancel();
                    }
                    _ = token.cancelled() => {}
                }
            })
        });

        let result = self.run_inner(options, &token).await;

        if let Some(timer) = deadline_timer {
            timer.abort();
        }

        match &result {
            Ok(report) => info!(
                dry_run = report.dry_run,
                loaded = report.loaded,
                updated = report.updated,
                skipped = report.skipped,
                not_started = report.not_started,
                failed = report.failures.len(),
                duration_ms = start.elapsed().as_millis() as u64,
                "Sync completed"
            ),
            Err(e) => error!(error = %e, "Sync aborted"),
        }

        result
    }

    async fn run_inner(
        &self,
        options: &SyncOptions,
        token: &CancellationToken,
    ) -> Result<SyncReport> {
        let records = tokio::select! {
            biased;
            _ = token.cancelled() => return Err(SyncError::Cancelled),
            listed = self.store.list_records(options.limit) => listed.map_err(SyncError::Fetch)?,
        };

        info!(
            result_count = records.len(),
            dry_run = options.dry_run,
            only_missing = options.only_missing,
            concurrency = options.concurrency,
            "Loaded inventory"
        );

        let mut report = SyncReport::new(options.dry_run, records.len());

        let outcomes = if options.concurrency <= 1 {
            self.process_sequential(records, options, token).await
        } else {
            self.process_concurrent(records, options, token).await
        };

        for outcome in outcomes {
            report.record(outcome);
        }
        report.cancelled = report.not_started > 0;

        Ok(report)
    }

    async fn process_sequential(
        &self,
        records: Vec<Record>,
        options: &SyncOptions,
        token: &CancellationToken,
    ) -> Vec<RecordOutcome> {
        let mut outcomes = Vec::with_capacity(records.len());

        for record in &records {
            if token.is_cancelled() {
                outcomes.push(RecordOutcome::NotStarted);
                continue;
            }
            let plan = self.plan(record, options.only_missing);
            outcomes.push(self.execute(plan, options.dry_run).await);
        }

        outcomes
    }

    async fn process_concurrent(
        &self,
        records: Vec<Record>,
        options: &SyncOptions,
        token: &CancellationToken,
    ) -> Vec<RecordOutcome> {
        let semaphore = Arc::new(Semaphore::new(options.concurrency));
        let mut tasks = JoinSet::new();
        let mut task_index = HashMap::new();
        let item_ids: Vec<Option<String>> = records
            .iter()
            .map(|r| r.id().map(str::to_string))
            .collect();

        for (index, record) in records.into_iter().enumerate() {
            let driver = self.clone();
            let semaphore = Arc::clone(&semaphore);
            let token = token.clone();
            let only_missing = options.only_missing;
            let dry_run = options.dry_run;

            let handle = tasks.spawn(async move {
                let permit = tokio::select! {
                    biased;
                    _ = token.cancelled() => None,
                    permit = semaphore.acquire_owned() => permit.ok(),
                };
                let outcome = match permit {
                    Some(_permit) if !token.is_cancelled() => {
                        let plan = driver.plan(&record, only_missing);
                        driver.execute(plan, dry_run).await
                    }
                    _ => RecordOutcome::NotStarted,
                };
                (index, outcome)
            });
            task_index.insert(handle.id(), index);
        }

        let mut slots: Vec<Option<RecordOutcome>> = vec![None; item_ids.len()];
        let mut join_errors: HashMap<usize, String> = HashMap::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => slots[index] = Some(outcome),
                Err(e) => {
                    error!(error = ?e, "Record task panicked");
                    if let Some(&index) = task_index.get(&e.id()) {
                        join_errors.insert(index, e.to_string());
                    }
                }
            }
        }

        // a task that died never reported; count it as a failed write
        slots
            .into_iter()
            .zip(item_ids)
            .enumerate()
            .map(|(index, (slot, item_id))| {
                slot.unwrap_or_else(|| {
                    let cause = join_errors
                        .remove(&index)
                        .unwrap_or_else(|| "record task did not complete".to_string());
                    let item_id = item_id.unwrap_or_else(|| "-".to_string());
                    warn!(item_id = %item_id, error = %cause, "Tag update failed");
                    RecordOutcome::Done {
                        decision: SyncDecision::UpdateFailed,
                        change: None,
                        failure: Some(RecordFailure {
                            item_id,
                            error: StoreError::Internal(cause),
                        }),
                    }
                })
            })
            .collect()
    }

    /// Carry out a plan: write for `update`, report everything else as-is.
    async fn execute(&self, plan: RecordPlan, dry_run: bool) -> RecordOutcome {
        let item_id = plan.item_id.as_deref().unwrap_or("-");
        debug!(item_id, decision = %plan.decision, "Planned record");

        if plan.decision != SyncDecision::Update {
            return RecordOutcome::Done {
                decision: plan.decision,
                change: None,
                failure: None,
            };
        }

        let Some(item_id) = plan.item_id else {
            return RecordOutcome::Done {
                decision: SyncDecision::SkipNoId,
                change: None,
                failure: None,
            };
        };
        let new = plan.new.as_strings();

        if dry_run {
            return RecordOutcome::Done {
                decision: SyncDecision::Update,
                change: Some(RecordChange {
                    item_id,
                    old: plan.old,
                    new,
                    applied: false,
                }),
                failure: None,
            };
        }

        match self.store.patch_tags(&item_id, &new).await {
            Ok(()) => RecordOutcome::Done {
                decision: SyncDecision::Update,
                change: Some(RecordChange {
                    item_id,
                    old: plan.old,
                    new,
                    applied: true,
                }),
                failure: None,
            },
            Err(e) => {
                warn!(item_id = %item_id, error = %e, "Tag update failed");
                RecordOutcome::Done {
                    decision: SyncDecision::UpdateFailed,
                    change: Some(RecordChange {
                        item_id: item_id.clone(),
                        old: plan.old,
                        new,
                        applied: false,
                    }),
                    failure: Some(RecordFailure { item_id, error: e }),
                }
            }
        }
    }
}
