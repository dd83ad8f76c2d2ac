//! # invtag-core
//!
//! Core types and the tag engine for invtag.
//!
//! This crate provides the record model, the canonicalizer, the ordered
//! pattern-rule table and the per-record [`TagInferencer`]. It performs no
//! I/O apart from reading profile files; the remote store is reached through
//! the [`RecordStore`] trait implemented in `invtag-client`.
//!
//! ```rust
//! use invtag_core::{Record, TagInferencer};
//!
//! let record = Record::new("inv-1")
//!     .with_category("Jewelry")
//!     .with_brand("Rolex")
//!     .with_description("14k gold ring");
//!
//! let tags = TagInferencer::default().infer_tags(&record);
//! assert_eq!(tags.as_strings(), vec!["jewelry", "rolex", "gold", "ring"]);
//! ```

pub mod canonical;
pub mod defaults;
pub mod error;
pub mod inference;
pub mod models;
pub mod profile;
pub mod rules;
pub mod traits;
pub mod vocabulary;

// Re-export commonly used types at crate root
pub use canonical::{sanitize, CanonicalTag, Canonicalizer};
pub use error::{Error, Result, StoreError};
pub use inference::{TagInferencer, TagSet};
pub use models::{InventoryPage, Record, TagPatch};
pub use profile::TaggingProfile;
pub use rules::{PatternRule, RuleSpec, RuleTable};
pub use traits::RecordStore;
pub use vocabulary::Vocabulary;
