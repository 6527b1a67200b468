//! Multi-word value assembly.
//!
//! Names, addresses and descriptions span several OCR words. Three walks
//! stitch them back together:
//! - forward by reading order from a caption,
//! - forward by text offset from a shared party anchor ("Seller:"),
//! - backward from a caption printed under its value.
//!
//! Each walk yields at most one aggregate candidate per label.

use std::collections::BTreeMap;

use crate::models::{AssemblyConfig, CanonicalField, FieldCategory, ValueKind};
use crate::ocr::{IndexedWord, Point, PositionalIndex};

use super::labels::LabelMatch;
use super::resolver::FieldCandidate;
use super::rules::{collapse_whitespace, keyword_form};
use super::rules::patterns::{
    EDGE_PUNCTUATION, LEADING_DIGIT, LEADING_PUNCTUATION, LETTER, PHONE_EXACT, PHONE_PREFIX,
    TRAILING_COLON,
};

/// Label recorded on candidates from the shared-anchor walk.
pub const SHARED_ANCHOR_LABEL: &str = "Seller:";

/// Join words into one candidate with averaged position and confidence.
///
/// `origin` is the label center; without one the distance is 0.
pub fn aggregate(
    words: &[&IndexedWord<'_>],
    value: String,
    origin: Option<Point>,
    label: &str,
) -> Option<FieldCandidate> {
    if words.is_empty() || value.trim().is_empty() {
        return None;
    }

    let position = Point::mean(words.iter().map(|w| w.center));
    let confidence = words.iter().map(|w| w.confidence).sum::<f32>() / words.len() as f32;
    let distance = origin.map_or(0.0, |o| position.distance_to(o));

    Some(FieldCandidate::new(value.trim(), confidence, distance, label, position))
}

/// Strictly inside an exclusive vertical band.
fn within((lo, hi): (f32, f32), dy: f32) -> bool {
    dy > lo && dy < hi
}

fn joined(words: &[&IndexedWord<'_>]) -> String {
    words
        .iter()
        .map(|w| w.text.trim())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Assembly strategies over one document's index.
#[derive(Debug, Clone, Copy)]
pub struct Assembler<'c> {
    config: &'c AssemblyConfig,
}

impl<'c> Assembler<'c> {
    pub fn new(config: &'c AssemblyConfig) -> Self {
        Self { config }
    }

    fn in_list(list: &[String], text: &str) -> bool {
        let keyword = keyword_form(text);
        list.iter().any(|k| *k == keyword)
    }

    fn is_section_keyword(&self, text: &str) -> bool {
        Self::in_list(&self.config.section_keywords, text)
    }

    fn is_label_word(&self, text: &str) -> bool {
        Self::in_list(&self.config.label_words, text)
    }

    fn is_filler(&self, text: &str) -> bool {
        self.config.filler_tokens.iter().any(|f| f == text)
    }

    fn is_separator(&self, text: &str) -> bool {
        self.config.separators.iter().any(|s| s == text)
    }

    /// Another field's caption: an indicator word together with a colon.
    pub fn looks_like_label(&self, text: &str) -> bool {
        let upper = text.to_uppercase();
        text.contains(':')
            && self
                .config
                .label_indicators
                .iter()
                .any(|i| upper.contains(i.as_str()))
    }

    fn word_cap(&self, field: CanonicalField) -> usize {
        match field.category() {
            FieldCategory::AddressLike => self.config.max_address_words,
            _ => self.config.max_words,
        }
    }

    /// Walk words after the label in reading order, nearest line first.
    pub fn forward(
        &self,
        field: CanonicalField,
        label: &LabelMatch<'_>,
        index: &PositionalIndex<'_>,
    ) -> Option<FieldCandidate> {
        let profile = field.profile();
        let origin = label.anchor.center;
        let (min_dx, (min_dy, max_dy)) = if profile.columnar {
            (self.config.column_min_dx, self.config.column_dy)
        } else {
            (-self.config.forward_left_reach, self.config.forward_dy)
        };

        let mut nearby: Vec<(f32, f32, &IndexedWord<'_>)> = index
            .iter()
            .filter(|w| w.sequence_index > label.anchor.sequence_index && !label.covers(w))
            .filter_map(|w| {
                let (dx, dy) = w.center.offset_from(origin);
                (dx > min_dx && dy >= min_dy && dy <= max_dy).then_some((dx, dy, w))
            })
            .collect();
        nearby.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.total_cmp(&b.0)));
        nearby.truncate(self.word_cap(field));

        let mut parts = Vec::new();
        for (_, _, word) in nearby {
            let text = word.text.trim();
            if text.is_empty() {
                continue;
            }
            if self.looks_like_label(text) || self.is_separator(text) {
                break;
            }
            if profile.columnar && (self.is_section_keyword(text) || PHONE_EXACT.is_match(text)) {
                break;
            }
            parts.push(word);
        }

        let value = collapse_whitespace(&joined(&parts));
        let value = TRAILING_COLON.replace(&value, "").into_owned();
        aggregate(&parts, value, Some(origin), label.matched_text)
    }

    /// Walk words following a shared anchor in text order.
    ///
    /// Only the name, address and phone of the anchored party are read this
    /// way; the other fields yield nothing.
    pub fn from_text_offset(
        &self,
        field: CanonicalField,
        label: &LabelMatch<'_>,
        index: &PositionalIndex<'_>,
    ) -> Option<FieldCandidate> {
        let kind = field.profile().kind;
        let window = match kind {
            ValueKind::Phone => self.config.phone_char_window,
            _ => self.config.char_window,
        };
        let words = index.words_after_offset(label.end, window);

        match kind {
            ValueKind::PersonName => self.name_after_anchor(words),
            ValueKind::Address => self.address_after_anchor(words),
            ValueKind::Phone => words
                .iter()
                .find(|w| PHONE_PREFIX.is_match(w.text.trim()))
                .and_then(|w| aggregate(&[w], w.text.trim().to_string(), None, SHARED_ANCHOR_LABEL)),
            _ => None,
        }
    }

    fn is_anchor_stop(&self, text: &str) -> bool {
        Self::in_list(&self.config.anchor_stop_keywords, text)
    }

    /// Another caption, a separator or a section keyword ends any walk.
    fn ends_value(&self, text: &str) -> bool {
        self.looks_like_label(text) || self.is_separator(text) || self.is_section_keyword(text)
    }

    fn name_after_anchor(&self, words: &[IndexedWord<'_>]) -> Option<FieldCandidate> {
        let mut parts = Vec::new();
        for word in words.iter().take(self.config.name_scan_words) {
            let text = word.text.trim();
            if LEADING_DIGIT.is_match(text)
                || PHONE_PREFIX.is_match(text)
                || self.is_anchor_stop(text)
                || self.ends_value(text)
            {
                break;
            }
            parts.push(word);
        }

        let value = LEADING_PUNCTUATION.replace(&joined(&parts), "").into_owned();
        aggregate(&parts, value, None, SHARED_ANCHOR_LABEL)
    }

    fn address_after_anchor(&self, words: &[IndexedWord<'_>]) -> Option<FieldCandidate> {
        // The name comes first; the address starts at the first numeric word
        // after it.
        let mut seen_name = false;
        let mut start = None;
        for (i, word) in words.iter().take(self.config.address_scan_words).enumerate() {
            let text = word.text.trim();
            if LEADING_DIGIT.is_match(text) {
                if seen_name {
                    start = Some(i);
                    break;
                }
            } else if LETTER.is_match(text) {
                seen_name = true;
            }
        }

        let mut parts = Vec::new();
        for word in words[start?..].iter().take(self.config.max_address_words) {
            let text = word.text.trim();
            if PHONE_PREFIX.is_match(text)
                || Self::in_list(&self.config.party_boundary_keywords, text)
                || self.ends_value(text)
            {
                break;
            }
            parts.push(word);
        }

        aggregate(&parts, joined(&parts), None, SHARED_ANCHOR_LABEL)
    }

    /// Walk backward from a caption printed under or after its value.
    pub fn backward(
        &self,
        field: CanonicalField,
        label: &LabelMatch<'_>,
        index: &PositionalIndex<'_>,
    ) -> Option<FieldCandidate> {
        let kind = field.profile().kind;
        let max_below = match kind {
            ValueKind::PersonName => self.config.name_max_below,
            ValueKind::Address => self.config.address_max_below,
            _ => return None,
        };
        let origin = label.anchor.center;

        let mut nearby: Vec<(f32, &IndexedWord<'_>)> = index
            .iter()
            .filter(|w| !label.covers(w))
            .filter_map(|w| {
                let (dx, dy) = w.center.offset_from(origin);
                let keep = dy <= max_below
                    && dx.abs() <= self.config.preceding_reach
                    && dy >= -self.config.preceding_max_above;
                keep.then_some((dy, w))
            })
            .collect();
        nearby.sort_by(|a, b| a.1.center.x.total_cmp(&b.1.center.x));

        let tolerance = self.config.same_line_tolerance;
        let same_line: Vec<&IndexedWord<'_>> = nearby
            .iter()
            .filter(|(dy, _)| dy.abs() < tolerance)
            .map(|(_, w)| *w)
            .collect();

        let parts = if kind == ValueKind::PersonName {
            let above: Vec<&IndexedWord<'_>> = nearby
                .iter()
                .filter(|(dy, _)| within(self.config.name_above_band, *dy))
                .map(|(_, w)| *w)
                .collect();

            let name = self.walk_name(&same_line);
            if self.is_significant(&name) {
                name
            } else {
                self.walk_name(&above)
            }
        } else {
            let banded: Vec<&IndexedWord<'_>> = nearby
                .iter()
                .filter(|(dy, _)| {
                    within(self.config.address_above_band, *dy)
                        || within(self.config.address_below_band, *dy)
                })
                .map(|(_, w)| *w)
                .collect();

            let line = self.walk_address_lines(&banded);
            if line.is_empty() {
                self.address_fragments(&same_line)
            } else {
                line
            }
        };

        let value = EDGE_PUNCTUATION.replace_all(&joined(&parts), "").into_owned();
        aggregate(&parts, value, Some(origin), label.matched_text)
    }

    fn walk_name<'w, 'a>(&self, words: &[&'w IndexedWord<'a>]) -> Vec<&'w IndexedWord<'a>> {
        let mut parts = Vec::new();
        for &word in words {
            let text = word.text.trim();
            if text.is_empty() || self.is_filler(text) || self.is_label_word(text) {
                continue;
            }
            if self.is_section_keyword(text) || PHONE_PREFIX.is_match(text) {
                break;
            }
            parts.push(word);
            if parts.len() >= self.config.max_name_words {
                break;
            }
        }
        parts
    }

    /// Enough tokens of a usable length to trust a same-line name.
    fn is_significant(&self, words: &[&IndexedWord<'_>]) -> bool {
        words
            .iter()
            .filter(|w| w.text.trim().chars().count() >= self.config.significant_token_len)
            .count()
            >= self.config.min_significant_tokens
    }

    /// Group words into lines and walk the first line that starts with a
    /// street number.
    fn walk_address_lines<'w, 'a>(&self, words: &[&'w IndexedWord<'a>]) -> Vec<&'w IndexedWord<'a>> {
        let mut lines: BTreeMap<i64, Vec<&'w IndexedWord<'a>>> = BTreeMap::new();
        for &word in words {
            let key = (word.center.y / self.config.line_bucket).round() as i64;
            lines.entry(key).or_default().push(word);
        }

        // Words arrive sorted by x, so each line is already left to right.
        let Some(line) = lines
            .into_values()
            .find(|line| line.first().is_some_and(|w| LEADING_DIGIT.is_match(w.text.trim())))
        else {
            return Vec::new();
        };

        let mut parts = Vec::new();
        for word in line {
            let text = word.text.trim();
            if text.is_empty() || self.is_filler(text) || self.is_label_word(text) {
                continue;
            }
            if self.is_section_keyword(text) || PHONE_PREFIX.is_match(text) {
                break;
            }
            parts.push(word);
            if parts.len() >= self.config.max_line_address_words {
                break;
            }
        }
        parts
    }

    /// Numeric or street-suffix tokens from the label's own line.
    fn address_fragments<'w, 'a>(&self, words: &[&'w IndexedWord<'a>]) -> Vec<&'w IndexedWord<'a>> {
        let mut parts = Vec::new();
        for &word in words {
            let text = word.text.trim();
            if text.is_empty() || self.is_filler(text) || self.is_label_word(text) {
                continue;
            }
            if self.is_section_keyword(text) || PHONE_PREFIX.is_match(text) {
                break;
            }
            let upper = text.to_uppercase();
            let is_street_part = LEADING_DIGIT.is_match(text)
                || self
                    .config
                    .street_suffixes
                    .iter()
                    .any(|s| upper.contains(s.as_str()));
            if is_street_part {
                parts.push(word);
                if parts.len() >= self.config.max_fragment_words {
                    break;
                }
            }
        }
        parts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agreement::labels::{LabelKind, LabelMatcher};
    use crate::models::{LabelTable, SearchConfig};
    use crate::ocr::WordToken;

    fn word(text: &str, x: i32, y: i32) -> WordToken {
        WordToken::from_rect(text, x - 10, y - 5, x + 10, y + 5)
    }

    fn text_of(words: &[WordToken]) -> String {
        words.iter().map(|w| w.text.as_str()).collect::<Vec<_>>().join(" ")
    }

    fn first_label<'a>(
        field: CanonicalField,
        text: &'a str,
        index: &PositionalIndex<'a>,
        kind: LabelKind,
    ) -> LabelMatch<'a> {
        let matcher = LabelMatcher::new(&LabelTable::default(), &SearchConfig::default()).unwrap();
        matcher
            .find_labels(field, text, index)
            .into_iter()
            .find(|m| m.kind == kind)
            .unwrap()
    }

    #[test]
    fn test_forward_column_stops_at_section_keyword() {
        let words = vec![
            word("Buyer's", 100, 100),
            word("Name:", 160, 100),
            word("Jane", 200, 130),
            word("Q.", 250, 130),
            word("Public", 300, 130),
            word("BUYER", 360, 130),
            word("Smith", 420, 130),
        ];
        let text = text_of(&words);
        let index = PositionalIndex::build(&words);
        let label = first_label(CanonicalField::BuyerName, &text, &index, LabelKind::Caption);

        let config = AssemblyConfig::default();
        let candidate = Assembler::new(&config)
            .forward(CanonicalField::BuyerName, &label, &index)
            .unwrap();
        assert_eq!(candidate.value, "Jane Q. Public");
        assert_eq!(candidate.label, "Buyer's Name:");
    }

    #[test]
    fn test_forward_stops_at_next_label() {
        let words = vec![
            word("Description", 100, 100),
            word("of", 180, 100),
            word("Goods", 230, 100),
            word("Water", 300, 100),
            word("Softener", 370, 100),
            word("Quantity:", 450, 100),
            word("1", 500, 100),
        ];
        let text = text_of(&words);
        let index = PositionalIndex::build(&words);
        let label = first_label(CanonicalField::ItemsPurchased, &text, &index, LabelKind::Caption);

        let config = AssemblyConfig::default();
        let candidate = Assembler::new(&config)
            .forward(CanonicalField::ItemsPurchased, &label, &index)
            .unwrap();
        assert_eq!(candidate.value, "Water Softener");
        assert_eq!(candidate.position, Point::new(335.0, 100.0));
        assert_eq!(candidate.distance, 235.0);
    }

    #[test]
    fn test_text_offset_walks() {
        let words = vec![
            word("Seller:", 100, 100),
            word("Acme", 160, 100),
            word("Co", 200, 100),
            word("123", 100, 130),
            word("Main", 150, 130),
            word("St", 190, 130),
            word("555-111-2222", 120, 160),
            word("Buyer:", 100, 200),
        ];
        let text = text_of(&words);
        let index = PositionalIndex::build(&words);
        let label = first_label(CanonicalField::SellerName, &text, &index, LabelKind::SharedAnchor);

        let config = AssemblyConfig::default();
        let assembler = Assembler::new(&config);

        let name = assembler
            .from_text_offset(CanonicalField::SellerName, &label, &index)
            .unwrap();
        assert_eq!(name.value, "Acme Co");
        assert_eq!(name.distance, 0.0);
        assert_eq!(name.label, SHARED_ANCHOR_LABEL);

        let address = assembler
            .from_text_offset(CanonicalField::SellerAddress, &label, &index)
            .unwrap();
        assert_eq!(address.value, "123 Main St");

        let phone = assembler
            .from_text_offset(CanonicalField::SellerPhoneNumber, &label, &index)
            .unwrap();
        assert_eq!(phone.value, "555-111-2222");

        assert!(assembler
            .from_text_offset(CanonicalField::SellerCity, &label, &index)
            .is_none());
    }

    #[test]
    fn test_text_offset_walks_stop_at_other_captions() {
        let words = vec![
            word("Seller:", 100, 100),
            word("Acme", 160, 100),
            word("Co", 200, 100),
            word("Make:", 260, 100),
            word("Culligan", 330, 100),
            word("123", 100, 130),
            word("Main", 150, 130),
            word("St", 190, 130),
            word("Amount", 250, 130),
            word("Financed:", 320, 130),
            word("$500.00", 400, 130),
            word("Seller", 100, 160),
            word("Name:", 160, 160),
        ];
        let text = text_of(&words);
        let index = PositionalIndex::build(&words);
        let label = first_label(CanonicalField::SellerName, &text, &index, LabelKind::SharedAnchor);

        let config = AssemblyConfig::default();
        let assembler = Assembler::new(&config);

        let name = assembler
            .from_text_offset(CanonicalField::SellerName, &label, &index)
            .unwrap();
        assert_eq!(name.value, "Acme Co");

        let address = assembler
            .from_text_offset(CanonicalField::SellerAddress, &label, &index)
            .unwrap();
        assert_eq!(address.value, "123 Main St Amount");
    }

    #[test]
    fn test_text_offset_address_stops_at_separator() {
        let words = vec![
            word("Seller:", 100, 100),
            word("Acme", 160, 100),
            word("9", 100, 130),
            word("Elm", 140, 130),
            word("|", 180, 130),
            word("Items", 220, 130),
        ];
        let text = text_of(&words);
        let index = PositionalIndex::build(&words);
        let label = first_label(CanonicalField::SellerAddress, &text, &index, LabelKind::SharedAnchor);

        let config = AssemblyConfig::default();
        let address = Assembler::new(&config)
            .from_text_offset(CanonicalField::SellerAddress, &label, &index)
            .unwrap();
        assert_eq!(address.value, "9 Elm");
    }

    #[test]
    fn test_text_offset_address_needs_a_name_first() {
        let words = vec![
            word("Seller:", 100, 100),
            word("42", 160, 100),
            word("Buyer:", 200, 100),
        ];
        let text = text_of(&words);
        let index = PositionalIndex::build(&words);
        let label = first_label(CanonicalField::SellerAddress, &text, &index, LabelKind::SharedAnchor);

        let config = AssemblyConfig::default();
        assert!(Assembler::new(&config)
            .from_text_offset(CanonicalField::SellerAddress, &label, &index)
            .is_none());
    }

    #[test]
    fn test_backward_name_on_label_line() {
        let words = vec![
            word("Acme", 100, 200),
            word("Supply", 160, 200),
            word("Co", 220, 200),
            word("Seller's", 300, 200),
            word("Name", 360, 200),
        ];
        let text = text_of(&words);
        let index = PositionalIndex::build(&words);
        let label = first_label(CanonicalField::SellerName, &text, &index, LabelKind::ValuePrecedes);

        let config = AssemblyConfig::default();
        let candidate = Assembler::new(&config)
            .backward(CanonicalField::SellerName, &label, &index)
            .unwrap();
        assert_eq!(candidate.value, "Acme Supply Co");
    }

    #[test]
    fn test_backward_name_falls_back_to_line_above() {
        // One significant token on the label line is not enough.
        let words = vec![
            word("Acme", 100, 180),
            word("Supply", 160, 180),
            word("Co", 220, 180),
            word("Xy", 100, 200),
            word("Seller's", 300, 200),
            word("Name", 360, 200),
        ];
        let text = text_of(&words);
        let index = PositionalIndex::build(&words);
        let label = first_label(CanonicalField::SellerName, &text, &index, LabelKind::ValuePrecedes);

        let config = AssemblyConfig::default();
        let candidate = Assembler::new(&config)
            .backward(CanonicalField::SellerName, &label, &index)
            .unwrap();
        assert_eq!(candidate.value, "Acme Supply Co");
    }

    #[test]
    fn test_backward_address_line_and_fragments() {
        let words = vec![
            word("Acme", 100, 170),
            word("Supply", 160, 170),
            word("1901", 100, 180),
            word("Farragut", 160, 180),
            word("Ave,", 220, 180),
            word("Bristol,", 280, 180),
            word("PA", 330, 180),
            word("19007", 370, 180),
            word("Seller's", 300, 200),
            word("Address", 360, 200),
        ];
        let text = text_of(&words);
        let index = PositionalIndex::build(&words);
        let label =
            first_label(CanonicalField::SellerAddress, &text, &index, LabelKind::ValuePrecedes);

        let config = AssemblyConfig::default();
        let assembler = Assembler::new(&config);
        let candidate = assembler
            .backward(CanonicalField::SellerAddress, &label, &index)
            .unwrap();
        assert_eq!(candidate.value, "1901 Farragut Ave, Bristol, PA 19007");

        let same_line = vec![
            word("Suite", 80, 200),
            word("12", 120, 200),
            word("Oak", 160, 200),
            word("Street", 200, 200),
            word("Seller's", 300, 200),
            word("Address", 360, 200),
        ];
        let text = text_of(&same_line);
        let index = PositionalIndex::build(&same_line);
        let label =
            first_label(CanonicalField::SellerAddress, &text, &index, LabelKind::ValuePrecedes);
        let candidate = assembler
            .backward(CanonicalField::SellerAddress, &label, &index)
            .unwrap();
        assert_eq!(candidate.value, "12 Street");
    }

    #[test]
    fn test_looks_like_label() {
        let config = AssemblyConfig::default();
        let assembler = Assembler::new(&config);
        assert!(assembler.looks_like_label("Phone:"));
        assert!(!assembler.looks_like_label("Phone"));
        assert!(!assembler.looks_like_label("Acme:"));
    }
}
