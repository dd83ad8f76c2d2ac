//! Token normalization into canonical tags.
//!
//! Canonicalization is pure: lowercase, replace anything outside
//! `[a-z0-9-]` and whitespace with a space, collapse whitespace, then apply
//! the length bounds, the stop-word filter and a single synonym lookup.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use serde::Serialize;

use crate::defaults::{MAX_TAG_LEN, MIN_TAG_LEN};
use crate::vocabulary::Vocabulary;

/// A normalized tag. Only the [`Canonicalizer`] produces these.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CanonicalTag(String);

impl CanonicalTag {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Deref for CanonicalTag {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CanonicalTag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for CanonicalTag {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for CanonicalTag {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl PartialEq<String> for CanonicalTag {
    fn eq(&self, other: &String) -> bool {
        &self.0 == other
    }
}

/// Lowercase and strip a raw token down to `[a-z0-9-]` words separated by
/// single spaces.
pub fn sanitize(raw: &str) -> String {
    let replaced: String = raw
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Maps raw tokens to canonical tags using a shared [`Vocabulary`].
#[derive(Debug, Clone)]
pub struct Canonicalizer {
    vocabulary: Arc<Vocabulary>,
}

impl Default for Canonicalizer {
    fn default() -> Self {
        Self::new(Arc::new(Vocabulary::default()))
    }
}

impl Canonicalizer {
    pub fn new(vocabulary: Arc<Vocabulary>) -> Self {
        Self { vocabulary }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Normalize `raw`, or reject it with `None`.
    pub fn canonicalize(&self, raw: &str) -> Option<CanonicalTag> {
        let cleaned = sanitize(raw);
        let len = cleaned.chars().count();

        if cleaned.is_empty() || !(MIN_TAG_LEN..=MAX_TAG_LEN).contains(&len) {
            return None;
        }

        if self.vocabulary.is_stop_word(&cleaned) {
            return None;
        }

        match self.vocabulary.synonym(&cleaned) {
            Some(mapped) => Some(CanonicalTag(mapped.to_string())),
            None => Some(CanonicalTag(cleaned)),
        }
    }
}
