//! Tagging profiles: a vocabulary plus a rule table, optionally loaded from TOML.
//!
//! # Example TOML
//!
//! ```toml
//! # Merge with the built-in tables instead of replacing them.
//! extend = true
//!
//! stop_words = ["misc"]
//! placeholder_brands = ["generic"]
//! condition_grades = ["mint"]
//!
//! [synonyms]
//! colour = "color"
//!
//! [[rules]]
//! pattern = '\b(vinyl|lp)\b'
//! tag = "records"
//! ```
//!
//! Without `extend`, each table present in the file replaces the built-in one
//! and tables omitted from the file keep their built-in value.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info};

use crate::canonical::Canonicalizer;
use crate::error::{Error, Result};
use crate::inference::TagInferencer;
use crate::rules::{RuleSpec, RuleTable};
use crate::vocabulary::{
    Vocabulary, DEFAULT_CONDITION_GRADES, DEFAULT_PLACEHOLDER_BRANDS, DEFAULT_STOP_WORDS,
    DEFAULT_SYNONYMS,
};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProfileFile {
    #[serde(default)]
    extend: bool,
    stop_words: Option<Vec<String>>,
    synonyms: Option<BTreeMap<String, String>>,
    placeholder_brands: Option<Vec<String>>,
    condition_grades: Option<Vec<String>>,
    rules: Option<Vec<RuleSpec>>,
    max_tags: Option<usize>,
}

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

/// Everything the inferencer needs besides the record.
#[derive(Debug, Clone)]
pub struct TaggingProfile {
    pub vocabulary: Arc<Vocabulary>,
    pub rules: RuleTable,
    pub max_tags: usize,
}

impl Default for TaggingProfile {
    fn default() -> Self {
        Self {
            vocabulary: Arc::new(Vocabulary::default()),
            rules: RuleTable::default(),
            max_tags: crate::defaults::MAX_TAGS,
        }
    }
}

impl TaggingProfile {
    /// Parse and validate a profile document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ProfileFile = toml::from_str(content)?;

        let vocabulary = if file.extend {
            let synonyms = file.synonyms.unwrap_or_default();
            synonyms
                .into_iter()
                .fold(Vocabulary::default(), |v, (alias, canonical)| {
                    v.with_synonym(alias, canonical)
                })
                .with_stop_words(file.stop_words.unwrap_or_default())
                .with_placeholder_brands(file.placeholder_brands.unwrap_or_default())
                .with_condition_grades(file.condition_grades.unwrap_or_default())
        } else {
            let synonyms = file.synonyms.unwrap_or_else(|| {
                DEFAULT_SYNONYMS
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect()
            });
            synonyms
                .into_iter()
                .fold(Vocabulary::empty(), |v, (alias, canonical)| {
                    v.with_synonym(alias, canonical)
                })
                .with_stop_words(file.stop_words.unwrap_or_else(|| owned(DEFAULT_STOP_WORDS)))
                .with_placeholder_brands(
                    file.placeholder_brands
                        .unwrap_or_else(|| owned(DEFAULT_PLACEHOLDER_BRANDS)),
                )
                .with_condition_grades(
                    file.condition_grades
                        .unwrap_or_else(|| owned(DEFAULT_CONDITION_GRADES)),
                )
        };
        vocabulary.validate()?;

        let rules = match file.rules {
            Some(specs) if file.extend => {
                let mut table = RuleTable::default();
                table.extend(RuleTable::from_specs(&specs)?);
                table
            }
            Some(specs) => RuleTable::from_specs(&specs)?,
            None => RuleTable::default(),
        };

        let max_tags = file.max_tags.unwrap_or(crate::defaults::MAX_TAGS);
        if max_tags == 0 {
            return Err(Error::Config("max_tags must be at least 1".to_string()));
        }

        debug!(
            stop_words = vocabulary.stop_word_count(),
            synonyms = vocabulary.synonym_count(),
            rules = rules.len(),
            max_tags,
            extend = file.extend,
            "Parsed tagging profile"
        );

        Ok(Self {
            vocabulary: Arc::new(vocabulary),
            rules,
            max_tags,
        })
    }

    /// Read a profile from disk.
    pub fn from_file(path: &Path) -> Result<Self> {
        info!(path = %path.display(), "Loading tagging profile");
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Build an inferencer that uses this profile.
    pub fn into_inferencer(self) -> TagInferencer {
        TagInferencer::new(Canonicalizer::new(self.vocabulary), self.rules)
            .with_max_tags(self.max_tags)
    }
}
