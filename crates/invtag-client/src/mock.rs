//! In-memory record store for deterministic testing.
//!
//! Patches are applied to the stored records, so a second sync run sees the
//! tags written by the first one. Every call is logged for assertions, and
//! listing or individual patches can be made to fail.
//!
//! ## Usage
//!
//! ```rust
//! use invtag_client::mock::MockRecordStore;
//! use invtag_core::{Record, RecordStore, StoreError};
//!
//! # async fn demo() {
//! let store = MockRecordStore::new(vec![Record::new("a"), Record::new("b")])
//!     .with_patch_failure("b", StoreError::Transport("timed out".into()));
//!
//! assert!(store.patch_tags("a", &["gold".into()]).await.is_ok());
//! assert!(store.patch_tags("b", &["gold".into()]).await.is_err());
//! assert_eq!(store.patch_call_count(), 2);
//! # }
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use invtag_core::{Record, RecordStore, StoreError};

/// Mock record store for testing.
#[derive(Clone, Default)]
pub struct MockRecordStore {
    records: Arc<Mutex<Vec<Record>>>,
    config: Arc<MockConfig>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

#[derive(Debug, Clone, Default)]
struct MockConfig {
    list_failure: Option<StoreError>,
    patch_failures: HashMap<String, StoreError>,
    latency_ms: u64,
}

/// One call received by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    List { limit: usize },
    Patch { item_id: String, tags: Vec<String> },
}

impl MockRecordStore {
    /// Create a store holding `records`.
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
            config: Arc::new(MockConfig::default()),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Make every listing call fail with `error`.
    pub fn with_list_failure(mut self, error: StoreError) -> Self {
        Arc::make_mut(&mut self.config).list_failure = Some(error);
        self
    }

    /// Make patches of `item_id` fail with `error`.
    pub fn with_patch_failure(mut self, item_id: impl Into<String>, error: StoreError) -> Self {
        Arc::make_mut(&mut self.config)
            .patch_failures
            .insert(item_id.into(), error);
        self
    }

    /// Set simulated latency for all operations.
    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        Arc::make_mut(&mut self.config).latency_ms = latency_ms;
        self
    }

    /// Snapshot of the stored records.
    pub fn records(&self) -> Vec<Record> {
        self.records.lock().unwrap().clone()
    }

    /// Current tags of one record.
    pub fn tags_of(&self, item_id: &str) -> Option<Vec<String>> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id() == Some(item_id))
            .map(|r| r.tags.clone())
    }

    /// Get all logged calls for assertion.
    pub fn calls(&self) -> Vec<MockCall> {
        self.call_log.lock().unwrap().clone()
    }

    /// Clear the call log.
    pub fn clear_calls(&self) {
        self.call_log.lock().unwrap().clear()
    }

    /// Get number of list calls.
    pub fn list_call_count(&self) -> usize {
        self.call_log
            .lock()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, MockCall::List { .. }))
            .count()
    }

    /// Get number of patch calls, including failed ones.
    pub fn patch_call_count(&self) -> usize {
        self.patched_ids().len()
    }

    /// Ids passed to patch calls, in call order.
    pub fn patched_ids(&self) -> Vec<String> {
        self.call_log
            .lock()
            .unwrap()
            .iter()
            .filter_map(|c| match c {
                MockCall::Patch { item_id, .. } => Some(item_id.clone()),
                _ => None,
            })
            .collect()
    }

    fn log(&self, call: MockCall) {
        self.call_log.lock().unwrap().push(call);
    }

    async fn simulate_latency(&self) {
        if self.config.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.latency_ms)).await;
        }
    }
}

#[async_trait]
impl RecordStore for MockRecordStore {
    async fn list_records(&self, limit: usize) -> Result<Vec<Record>, StoreError> {
        self.log(MockCall::List { limit });
        self.simulate_latency().await;

        if let Some(err) = &self.config.list_failure {
            return Err(err.clone());
        }

        let records = self.records.lock().unwrap();
        Ok(records.iter().take(limit.max(1)).cloned().collect())
    }

    async fn patch_tags(&self, item_id: &str, tags: &[String]) -> Result<(), StoreError> {
        self.log(MockCall::Patch {
            item_id: item_id.to_string(),
            tags: tags.to_vec(),
        });
        self.simulate_latency().await;

        if let Some(err) = self.config.patch_failures.get(item_id) {
            return Err(err.clone());
        }

        let mut records = self.records.lock().unwrap();
        match records.iter_mut().find(|r| r.id() == Some(item_id)) {
            Some(record) => {
                record.tags = tags.to_vec();
                Ok(())
            }
            None => Err(StoreError::Status {
                status: 404,
                body: format!("item {} not found", item_id),
            }),
        }
    }
}
