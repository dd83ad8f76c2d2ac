//! Lookup data driving canonicalization: stop words, synonyms, placeholder
//! brands and condition grades.
//!
//! A [`Vocabulary`] is immutable once built and shared behind an `Arc`. Tests
//! construct small tables with [`Vocabulary::empty`] and the `with_*` builders;
//! production code uses [`Vocabulary::default`] or a TOML profile (see
//! [`crate::profile`]).

use std::collections::{HashMap, HashSet};

use crate::canonical::sanitize;
use crate::defaults::{MAX_TAG_LEN, MIN_TAG_LEN};
use crate::error::{Error, Result};

/// Filler words that never become tags.
pub const DEFAULT_STOP_WORDS: &[&str] = &[
    "the", "and", "for", "with", "this", "that", "item", "any", "have", "show", "looking", "look",
    "please", "sale", "sell", "new", "used",
];

/// Alternate spelling → canonical form. Values must already be canonical.
pub const DEFAULT_SYNONYMS: &[(&str, &str)] = &[
    ("gun", "firearms"),
    ("guns", "firearms"),
    ("firearm", "firearms"),
    ("pistol", "handgun"),
    ("revolver", "handgun"),
    ("rifle", "long-gun"),
    ("shotgun", "long-gun"),
    ("jewelery", "jewelry"),
    ("jewellery", "jewelry"),
    ("necklaces", "necklace"),
    ("chains", "chain"),
    ("rings", "ring"),
    ("sterling", "silver"),
    ("goldtone", "gold-tone"),
];

/// Brand values that carry no information.
pub const DEFAULT_PLACEHOLDER_BRANDS: &[&str] = &["unknown", "unbranded", "none", "n/a"];

/// Condition values that produce a `<grade>-condition` tag.
pub const DEFAULT_CONDITION_GRADES: &[&str] = &["excellent", "good", "fair", "poor"];

/// Immutable tag vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    stop_words: HashSet<String>,
    synonyms: HashMap<String, String>,
    placeholder_brands: HashSet<String>,
    condition_grades: Vec<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            stop_words: DEFAULT_STOP_WORDS.iter().map(|s| s.to_string()).collect(),
            synonyms: DEFAULT_SYNONYMS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            placeholder_brands: DEFAULT_PLACEHOLDER_BRANDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            condition_grades: DEFAULT_CONDITION_GRADES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Vocabulary {
    /// A vocabulary with no entries at all.
    pub fn empty() -> Self {
        Self {
            stop_words: HashSet::new(),
            synonyms: HashMap::new(),
            placeholder_brands: HashSet::new(),
            condition_grades: Vec::new(),
        }
    }

    /// Add stop words (matched against sanitized tokens).
    pub fn with_stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop_words.extend(words.into_iter().map(Into::into));
        self
    }

    /// Add or replace a synonym mapping.
    pub fn with_synonym(mut self, alias: impl Into<String>, canonical: impl Into<String>) -> Self {
        self.synonyms.insert(alias.into(), canonical.into());
        self
    }

    /// Add brand placeholders that should not become tags.
    pub fn with_placeholder_brands<I, S>(mut self, brands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.placeholder_brands
            .extend(brands.into_iter().map(|b| b.into().trim().to_lowercase()));
        self
    }

    /// Add condition grades. Order is irrelevant; each grade maps to one tag.
    pub fn with_condition_grades<I, S>(mut self, grades: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for grade in grades {
            let grade = grade.into().trim().to_lowercase();
            if !self.condition_grades.contains(&grade) {
                self.condition_grades.push(grade);
            }
        }
        self
    }

    pub fn is_stop_word(&self, token: &str) -> bool {
        self.stop_words.contains(token)
    }

    /// Single-step synonym lookup. Never chains.
    pub fn synonym(&self, token: &str) -> Option<&str> {
        self.synonyms.get(token).map(String::as_str)
    }

    /// Whether a normalized (trimmed, lowercased) brand is a placeholder.
    pub fn is_placeholder_brand(&self, brand: &str) -> bool {
        self.placeholder_brands.contains(brand)
    }

    /// Tag for a normalized condition value, e.g. `good` → `good-condition`.
    pub fn condition_label(&self, condition: &str) -> Option<String> {
        self.condition_grades
            .iter()
            .find(|grade| grade.as_str() == condition)
            .map(|grade| format!("{}-condition", grade))
    }

    pub fn stop_word_count(&self) -> usize {
        self.stop_words.len()
    }

    pub fn synonym_count(&self) -> usize {
        self.synonyms.len()
    }

    /// Check that every synonym value is a fixed point of canonicalization.
    ///
    /// A value must sanitize to itself, fit the length bounds, not be a stop
    /// word, and, when it is itself a key, map to itself.
    pub fn validate(&self) -> Result<()> {
        let mut aliases: Vec<&String> = self.synonyms.keys().collect();
        aliases.sort();

        for alias in aliases {
            let value = &self.synonyms[alias];

            if sanitize(value) != *value {
                return Err(Error::Vocabulary(format!(
                    "synonym {:?} maps to {:?}, which is not a sanitized tag",
                    alias, value
                )));
            }

            let len = value.chars().count();
            if !(MIN_TAG_LEN..=MAX_TAG_LEN).contains(&len) {
                return Err(Error::Vocabulary(format!(
                    "synonym {:?} maps to {:?}, outside {}..={} characters",
                    alias, value, MIN_TAG_LEN, MAX_TAG_LEN
                )));
            }

            if self.is_stop_word(value) {
                return Err(Error::Vocabulary(format!(
                    "synonym {:?} maps to stop word {:?}",
                    alias, value
                )));
            }

            if let Some(next) = self.synonym(value) {
                if next != value {
                    return Err(Error::Vocabulary(format!(
                        "synonym chain {:?} -> {:?} -> {:?}",
                        alias, value, next
                    )));
                }
            }
        }

        Ok(())
    }
}
