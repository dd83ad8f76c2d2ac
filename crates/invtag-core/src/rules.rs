//! Ordered pattern rules mapping free text to tags.
//!
//! Each rule is a `(pattern, tag)` pair. Every rule whose pattern matches
//! contributes its tag, in table order; rules are not mutually exclusive.
//! Adding a category means adding a row, not a branch.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Reference rule table, in priority order.
pub const DEFAULT_RULE_PATTERNS: &[(&str, &str)] = &[
    (r"\b(gold|10k|14k|18k|24k|karat)\b", "gold"),
    (r"\b(silver|sterling)\b", "silver"),
    (r"\b(platinum)\b", "platinum"),
    (r"\b(necklace|chain|pendant)\b", "necklace"),
    (r"\b(ring|band)\b", "ring"),
    (r"\b(bracelet)\b", "bracelet"),
    (r"\b(watch|chronograph)\b", "watch"),
    (r"\b(vintage|retro|classic)\b", "vintage"),
    (r"\b(cordless|wireless)\b", "wireless"),
    (r"\b(acoustic)\b", "acoustic"),
    (r"\b(electric)\b", "electric"),
    (
        r"\b(glock|taurus|ruger|colt|9mm|pistol|handgun|firearm)\b",
        "handgun",
    ),
    (r"\b(rifle|shotgun)\b", "long-gun"),
    (
        r"\b(phone|iphone|android|laptop|tablet|camera|console)\b",
        "electronics",
    ),
    (r"\b(drill|saw|tool|wrench)\b", "tools"),
    (r"\b(guitar|piano|drum|amplifier|amp)\b", "musical"),
];

static DEFAULT_RULES: Lazy<RuleTable> = Lazy::new(|| {
    RuleTable::from_pairs(DEFAULT_RULE_PATTERNS).expect("default rule patterns must compile")
});

/// Serializable form of a rule, as found in profile files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    pub pattern: String,
    pub tag: String,
}

/// One compiled rule.
#[derive(Debug, Clone)]
pub struct PatternRule {
    pattern: Regex,
    tag: String,
}

impl PatternRule {
    /// Compile a rule. Invalid patterns are reported with the offending tag.
    pub fn new(pattern: &str, tag: impl Into<String>) -> Result<Self> {
        let tag = tag.into();
        let compiled = Regex::new(pattern).map_err(|e| Error::InvalidRule {
            pattern: pattern.to_string(),
            tag: tag.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            pattern: compiled,
            tag,
        })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }
}

/// Ordered rule table.
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<PatternRule>,
}

impl Default for RuleTable {
    fn default() -> Self {
        DEFAULT_RULES.clone()
    }
}

impl RuleTable {
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn from_pairs(pairs: &[(&str, &str)]) -> Result<Self> {
        let rules = pairs
            .iter()
            .map(|(pattern, tag)| PatternRule::new(pattern, *tag))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    pub fn from_specs(specs: &[RuleSpec]) -> Result<Self> {
        let rules = specs
            .iter()
            .map(|spec| PatternRule::new(&spec.pattern, spec.tag.clone()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// Append a rule after all existing ones.
    pub fn push(&mut self, rule: PatternRule) {
        self.rules.push(rule);
    }

    /// Append every rule of `other`, keeping its order.
    pub fn extend(&mut self, other: RuleTable) {
        self.rules.extend(other.rules);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    /// Tags of every rule matching `text`, in table order.
    pub fn matching_tags<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.rules
            .iter()
            .filter(move |rule| rule.is_match(text))
            .map(PatternRule::tag)
    }
}
