//! # invtag-client
//!
//! Remote record store access for invtag.
//!
//! This crate provides:
//! - [`HttpRecordStore`], the `reqwest`-based client for the inventory API
//! - [`ClientConfig`], its configuration (defaults, environment, validation)
//! - [`mock::MockRecordStore`], an in-memory store (feature `mock`)
//!
//! # Example
//!
//! ```rust,no_run
//! use invtag_client::{ClientConfig, HttpRecordStore};
//! use invtag_core::RecordStore;
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = HttpRecordStore::new(ClientConfig::from_env()).unwrap();
//!     let records = store.list_records(50).await.unwrap();
//!     println!("{} records", records.len());
//! }
//! ```

pub mod config;
pub mod http;

// In-memory record store for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use config::ClientConfig;
pub use http::HttpRecordStore;
