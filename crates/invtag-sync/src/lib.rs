//! # invtag-sync
//!
//! Idempotent read-compare-write reconciliation of inferred tags against a
//! [`RecordStore`](invtag_core::RecordStore).
//!
//! A run lists records, plans one [`SyncDecision`] per record and patches only
//! the records whose inferred tags differ, position by position, from what the
//! store holds. A second run against unchanged data writes nothing.
//!
//! Failures split into two kinds:
//!
//! - [`SyncError`]: the listing failed; nothing was processed.
//! - [`RecordFailure`]: one patch failed; the run carried on and the failure
//!   is listed in the [`SyncReport`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use invtag_client::HttpRecordStore;
//! use invtag_core::TagInferencer;
//! use invtag_sync::{SyncDriver, SyncOptions};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(HttpRecordStore::from_env()?);
//! let driver = SyncDriver::new(store, Arc::new(TagInferencer::default()));
//!
//! let report = driver.run(&SyncOptions::default().with_dry_run(true)).await?;
//! println!("{}", report.summary_line());
//! # Ok(())
//! # }
//! ```

pub mod decision;
pub mod driver;
pub mod error;
pub mod report;

pub use decision::SyncDecision;
pub use driver::{RecordPlan, SyncDriver, SyncOptions};
pub use error::{Result, SyncError};
pub use report::{RecordChange, RecordFailure, SyncReport};
