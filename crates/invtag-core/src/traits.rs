//! Core traits for invtag abstractions.
//!
//! The sync driver only ever talks to the record store through
//! [`RecordStore`], so the HTTP client and the in-memory mock are
//! interchangeable.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::Record;

/// Remote store holding catalog records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch up to `limit` records.
    async fn list_records(&self, limit: usize) -> Result<Vec<Record>, StoreError>;

    /// Replace the tags of one record.
    async fn patch_tags(&self, item_id: &str, tags: &[String]) -> Result<(), StoreError>;
}
