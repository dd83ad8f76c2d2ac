//! Tag inference for a single record.
//!
//! ## Candidate order
//!
//! Candidates are collected in priority order; the first occurrence of a
//! canonical tag keeps its slot:
//!
//! 1. category
//! 2. brand, unless it is a placeholder (`unknown`, `n/a`, ...)
//! 3. `<grade>-condition` for recognized condition grades
//! 4. every matching pattern rule, in table order, against
//!    `"{category} {brand} {description}"`
//! 5. the record's existing tags
//!
//! Each candidate is canonicalized; rejects are dropped, duplicates are
//! dropped, and the result is capped at `max_tags`. An empty result means
//! "no opinion", never "clear all tags".

use std::collections::HashSet;

use serde::Serialize;
use tracing::trace;

use crate::canonical::{CanonicalTag, Canonicalizer};
use crate::defaults::MAX_TAGS;
use crate::models::Record;
use crate::rules::RuleTable;

/// Deduplicated, priority-ordered, capped tag list for one record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TagSet(Vec<CanonicalTag>);

impl TagSet {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CanonicalTag> {
        self.0.iter()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t.as_str() == tag)
    }

    /// Plain strings, in order, as sent to the store.
    pub fn as_strings(&self) -> Vec<String> {
        self.0.iter().map(|t| t.as_str().to_string()).collect()
    }

    /// Positional equality with an existing tag sequence.
    pub fn matches(&self, existing: &[String]) -> bool {
        self.0.len() == existing.len()
            && self
                .0
                .iter()
                .zip(existing)
                .all(|(tag, old)| tag.as_str() == old)
    }
}

impl<'a> IntoIterator for &'a TagSet {
    type Item = &'a CanonicalTag;
    type IntoIter = std::slice::Iter<'a, CanonicalTag>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Derives tags for records from their fields and existing tags.
#[derive(Debug, Clone)]
pub struct TagInferencer {
    canonicalizer: Canonicalizer,
    rules: RuleTable,
    max_tags: usize,
}

impl Default for TagInferencer {
    fn default() -> Self {
        Self::new(Canonicalizer::default(), RuleTable::default())
    }
}

impl TagInferencer {
    pub fn new(canonicalizer: Canonicalizer, rules: RuleTable) -> Self {
        Self {
            canonicalizer,
            rules,
            max_tags: MAX_TAGS,
        }
    }

    /// Override the tag cap. Values below 1 are raised to 1.
    pub fn with_max_tags(mut self, max_tags: usize) -> Self {
        self.max_tags = max_tags.max(1);
        self
    }

    pub fn max_tags(&self) -> usize {
        self.max_tags
    }

    pub fn canonicalizer(&self) -> &Canonicalizer {
        &self.canonicalizer
    }

    /// Raw candidates before canonicalization, in priority order.
    pub fn candidates(&self, record: &Record) -> Vec<String> {
        let vocabulary = self.canonicalizer.vocabulary();
        let normalized = |field: &Option<String>| {
            field
                .as_deref()
                .map(|s| s.trim().to_lowercase())
                .unwrap_or_default()
        };

        let category = normalized(&record.category);
        let brand = normalized(&record.brand);
        let condition = normalized(&record.condition);
        let description = record.description.as_deref().unwrap_or_default();

        let mut candidates = Vec::new();

        if !category.is_empty() {
            candidates.push(category.clone());
        }

        if !brand.is_empty() && !vocabulary.is_placeholder_brand(&brand) {
            candidates.push(brand.clone());
        }

        if let Some(label) = vocabulary.condition_label(&condition) {
            candidates.push(label);
        }

        let blob = format!("{} {} {}", category, brand, description).to_lowercase();
        candidates.extend(self.rules.matching_tags(&blob).map(str::to_string));

        candidates.extend(record.tags.iter().cloned());

        candidates
    }

    /// Infer the tag set for `record`.
    pub fn infer_tags(&self, record: &Record) -> TagSet {
        let candidates = self.candidates(record);
        trace!(
            item_id = record.id().unwrap_or("-"),
            ?candidates,
            "Collected tag candidates"
        );

        let mut seen = HashSet::new();
        let mut tags = Vec::with_capacity(self.max_tags);

        for candidate in &candidates {
            let Some(tag) = self.canonicalizer.canonicalize(candidate) else {
                continue;
            };
            if seen.insert(tag.clone()) {
                tags.push(tag);
            }
            if tags.len() >= self.max_tags {
                break;
            }
        }

        TagSet(tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary::Vocabulary;
    use std::sync::Arc;

    fn infer(record: &Record) -> Vec<String> {
        TagInferencer::default().infer_tags(record).as_strings()
    }

    #[test]
    fn test_priority_order() {
        let record = Record::new("r1")
            .with_category("Jewelry")
            .with_brand("Rolex")
            .with_description("14k gold ring");

        assert_eq!(infer(&record), vec!["jewelry", "rolex", "gold", "ring"]);
    }

    #[test]
    fn test_placeholder_brand_skipped() {
        for brand in ["Unknown", " unbranded ", "NONE", "n/a"] {
            let record = Record::new("r").with_category("Tools").with_brand(brand);
            assert_eq!(infer(&record), vec!["tools"], "brand {:?}", brand);
        }
    }

    #[test]
    fn test_placeholder_brand_alone_yields_nothing() {
        let record = Record::new("r").with_brand("none");
        assert!(infer(&record).is_empty());
    }

    #[test]
    fn test_condition_labels() {
        let record = Record::new("r").with_condition("Excellent");
        assert_eq!(infer(&record), vec!["excellent-condition"]);

        let record = Record::new("r").with_condition("like new");
        assert!(infer(&record).is_empty());
    }

    #[test]
    fn test_existing_tags_appended_last_and_deduped() {
        let record = Record::new("r")
            .with_category("Jewelry")
            .with_description("sterling silver necklace")
            .with_tags(["Rings", "silver", "Heirloom", "the"]);

        assert_eq!(
            infer(&record),
            vec!["jewelry", "silver", "necklace", "ring", "heirloom"]
        );
    }

    #[test]
    fn test_category_synonym_resolved() {
        let record = Record::new("r").with_category("Jewellery");
        assert_eq!(infer(&record), vec!["jewelry"]);
    }

    #[test]
    fn test_cap_keeps_first_by_priority() {
        let record = Record::new("r")
            .with_category("Estate")
            .with_brand("Acme")
            .with_condition("good")
            .with_description(
                "vintage gold silver platinum necklace ring bracelet watch \
                 wireless acoustic electric guitar phone drill rifle glock",
            )
            .with_tags(["extra-one", "extra-two"]);

        let tags = infer(&record);
        assert_eq!(tags.len(), 12);
        assert_eq!(
            tags,
            vec![
                "estate",
                "acme",
                "good-condition",
                "gold",
                "silver",
                "platinum",
                "necklace",
                "ring",
                "bracelet",
                "watch",
                "vintage",
                "wireless",
            ]
        );
    }

    #[test]
    fn test_custom_cap() {
        let inferencer = TagInferencer::default().with_max_tags(2);
        let record = Record::new("r")
            .with_category("Jewelry")
            .with_brand("Rolex")
            .with_description("gold");
        assert_eq!(inferencer.infer_tags(&record).as_strings(), vec!["jewelry", "rolex"]);
    }

    #[test]
    fn test_empty_record_yields_empty_set() {
        let tags = TagInferencer::default().infer_tags(&Record::new("r"));
        assert!(tags.is_empty());
    }

    #[test]
    fn test_injected_vocabulary() {
        let vocab = Vocabulary::empty().with_stop_words(["jewelry"]);
        let inferencer = TagInferencer::new(
            Canonicalizer::new(Arc::new(vocab)),
            RuleTable::empty(),
        );
        let record = Record::new("r")
            .with_category("Jewelry")
            .with_brand("unknown")
            .with_description("gold ring");

        // no placeholder list, no rules: only the brand survives
        assert_eq!(inferencer.infer_tags(&record).as_strings(), vec!["unknown"]);
    }

    #[test]
    fn test_candidates_are_raw() {
        let record = Record::new("r")
            .with_category("  Jewelry ")
            .with_tags(["Rings"]);
        let candidates = TagInferencer::default().candidates(&record);
        assert_eq!(candidates, vec!["jewelry", "Rings"]);
    }

    #[test]
    fn test_tag_set_matches_is_positional() {
        let record = Record::new("r").with_category("Jewelry").with_description("gold");
        let tags = TagInferencer::default().infer_tags(&record);

        assert!(tags.matches(&["jewelry".to_string(), "gold".to_string()]));
        assert!(!tags.matches(&["gold".to_string(), "jewelry".to_string()]));
        assert!(!tags.matches(&["jewelry".to_string()]));
        assert!(tags.contains("gold"));
    }

    #[test]
    fn test_inference_is_stable_on_its_own_output() {
        let record = Record::new("r")
            .with_category("Musical Instruments")
            .with_brand("Fender")
            .with_condition("fair")
            .with_description("Electric guitar with amp");
        let first = TagInferencer::default().infer_tags(&record);

        let retagged = record.clone().with_tags(first.as_strings());
        let second = TagInferencer::default().infer_tags(&retagged);
        assert_eq!(first, second);
    }
}
