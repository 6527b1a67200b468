//! Label matching: locate field captions in the full text and pin each hit
//! to a word on the page.

use std::collections::HashMap;

use regex::{Regex, RegexBuilder};
use tracing::trace;

use crate::error::ConfigError;
use crate::models::{CanonicalField, LabelTable, SearchConfig};
use crate::ocr::{IndexedWord, PositionalIndex};

/// How a label relates to its value on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    /// A field-specific caption; the value sits to the right or below.
    Caption,
    /// A caption printed under or after its value ("Seller's Name").
    ValuePrecedes,
    /// A bare party anchor ("Seller:") followed by name, address and phone
    /// in reading order.
    SharedAnchor,
}

/// A label regex hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelMatch<'a> {
    pub field: CanonicalField,
    /// Which of the field's label variants matched.
    pub variant: usize,
    pub matched_text: &'a str,
    /// Byte offsets in the full text.
    pub start: usize,
    pub end: usize,
    /// The word containing `start`, or the nearest one.
    pub anchor: IndexedWord<'a>,
    pub kind: LabelKind,
}

impl LabelMatch<'_> {
    /// Whether a word's span overlaps the matched label text.
    pub fn covers(&self, word: &IndexedWord<'_>) -> bool {
        word.char_start < self.end && self.start < word.char_end
    }
}

fn compile(field: &str, pattern: &str) -> Result<Regex, ConfigError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| ConfigError::InvalidPattern {
            field: field.to_string(),
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })
}

/// Compiled label table.
#[derive(Debug, Clone)]
pub struct LabelMatcher {
    labels: HashMap<CanonicalField, Vec<Regex>>,
    shared_anchor: Regex,
    preceding_phrases: Vec<String>,
}

impl LabelMatcher {
    /// Compile every label pattern; fails on the first invalid one.
    pub fn new(table: &LabelTable, search: &SearchConfig) -> Result<Self, ConfigError> {
        let mut labels: HashMap<CanonicalField, Vec<Regex>> = HashMap::new();

        for spec in table.specs() {
            let compiled = labels.entry(spec.field).or_default();
            for pattern in &spec.patterns {
                compiled.push(compile(spec.field.as_str(), pattern)?);
            }
        }

        Ok(Self {
            labels,
            shared_anchor: compile("shared_anchor", &search.shared_anchor)?,
            preceding_phrases: search
                .preceding_label_phrases
                .iter()
                .map(|p| p.to_lowercase())
                .collect(),
        })
    }

    /// Number of label variants configured for a field.
    pub fn variant_count(&self, field: CanonicalField) -> usize {
        self.labels.get(&field).map_or(0, Vec::len)
    }

    /// All label hits for a field, in order of discovery (variant by variant).
    ///
    /// Hits that cannot be pinned to any word (empty index) are dropped.
    pub fn find_labels<'a>(
        &self,
        field: CanonicalField,
        full_text: &'a str,
        index: &PositionalIndex<'a>,
    ) -> Vec<LabelMatch<'a>> {
        let Some(variants) = self.labels.get(&field) else {
            return Vec::new();
        };

        let mut matches = Vec::new();
        for (variant, regex) in variants.iter().enumerate() {
            for m in regex.find_iter(full_text) {
                let Some(anchor) = index.locate(m.start()) else {
                    continue;
                };
                trace!(
                    "Label '{}' for {} (variant {}) at word '{}'",
                    m.as_str(),
                    field,
                    variant,
                    anchor.text
                );
                matches.push(LabelMatch {
                    field,
                    variant,
                    matched_text: m.as_str(),
                    start: m.start(),
                    end: m.end(),
                    anchor: *anchor,
                    kind: self.classify(field, m.as_str()),
                });
            }
        }
        matches
    }

    /// The first shared party anchor in the text, used when a seller field
    /// found nothing through its own captions.
    pub fn find_shared_anchor<'a>(
        &self,
        field: CanonicalField,
        full_text: &'a str,
        index: &PositionalIndex<'a>,
    ) -> Option<LabelMatch<'a>> {
        let m = self.shared_anchor.find(full_text)?;
        let anchor = index.locate(m.start())?;
        Some(LabelMatch {
            field,
            variant: self.variant_count(field),
            matched_text: m.as_str(),
            start: m.start(),
            end: m.end(),
            anchor: *anchor,
            kind: LabelKind::SharedAnchor,
        })
    }

    fn is_bare_anchor(&self, matched: &str) -> bool {
        let matched = matched.trim();
        self.shared_anchor
            .find(matched)
            .is_some_and(|m| m.start() == 0 && m.end() == matched.len())
    }

    fn classify(&self, field: CanonicalField, matched: &str) -> LabelKind {
        if !field.is_seller() {
            return LabelKind::Caption;
        }
        if self.is_bare_anchor(matched) {
            return LabelKind::SharedAnchor;
        }
        let lower = matched.to_lowercase();
        if self.preceding_phrases.iter().any(|p| lower.contains(p.as_str())) {
            LabelKind::ValuePrecedes
        } else {
            LabelKind::Caption
        }
    }
}
