//! Centralized default constants for invtag.
//!
//! All crates and the CLI reference these constants instead of defining their
//! own magic numbers.

// =============================================================================
// TAGS
// =============================================================================

/// Maximum number of tags kept for one record.
pub const MAX_TAGS: usize = 12;

/// Shortest accepted canonical tag, in characters.
pub const MIN_TAG_LEN: usize = 2;

/// Longest accepted canonical tag, in characters.
pub const MAX_TAG_LEN: usize = 30;

// =============================================================================
// REMOTE STORE
// =============================================================================

/// Default base URL of the inventory service.
pub const BASE_URL: &str = "http://localhost:3000";

/// Path of the inventory collection, relative to the base URL.
pub const INVENTORY_PATH: &str = "/api/inventory";

/// Timeout for each listing or patch request in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// SYNC
// =============================================================================

/// Default number of records requested per run.
pub const LIST_LIMIT: usize = 200;

/// Default number of records processed at once (1 = sequential).
pub const SYNC_CONCURRENCY: usize = 1;

/// Upper bound accepted for `--concurrency`.
pub const SYNC_CONCURRENCY_MAX: usize = 64;
