//! Candidate ranking and resolution.

use std::cmp::Ordering;

use serde::Serialize;

use crate::models::CanonicalField;
use crate::ocr::Point;

use super::rules::strip_trailing_artifacts;

/// A proposed value for one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldCandidate {
    pub value: String,
    /// Word confidence, averaged over contributing words.
    pub confidence: f32,
    /// Pixel distance from the label; 0 for text-order extraction.
    pub distance: f32,
    /// Label text that produced the candidate.
    pub label: String,
    /// Center of the contributing words.
    #[serde(skip)]
    pub position: Point,
}

impl FieldCandidate {
    pub fn new(
        value: impl Into<String>,
        confidence: f32,
        distance: f32,
        label: impl Into<String>,
        position: Point,
    ) -> Self {
        Self {
            value: value.into(),
            confidence,
            distance,
            label: label.into(),
            position,
        }
    }

    pub fn word_count(&self) -> usize {
        self.value.split_whitespace().count()
    }
}

/// Closest first, then most confident.
pub fn by_proximity(a: &FieldCandidate, b: &FieldCandidate) -> Ordering {
    a.distance
        .total_cmp(&b.distance)
        .then_with(|| b.confidence.total_cmp(&a.confidence))
}

/// Most words first, then closest, then most confident.
pub fn by_completeness(a: &FieldCandidate, b: &FieldCandidate) -> Ordering {
    b.word_count()
        .cmp(&a.word_count())
        .then_with(|| by_proximity(a, b))
}

/// Order candidates best-first for a field.
///
/// The sort is stable: full ties keep discovery order.
pub fn rank(field: CanonicalField, candidates: &mut [FieldCandidate]) {
    if field.category().prefers_more_words() {
        candidates.sort_by(by_completeness);
    } else {
        candidates.sort_by(by_proximity);
    }
}

/// Pick one value for a field, or none.
pub fn resolve(field: CanonicalField, mut candidates: Vec<FieldCandidate>) -> Option<String> {
    rank(field, &mut candidates);
    let best = candidates.first()?;
    let value = strip_trailing_artifacts(&best.value);
    (!value.is_empty()).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(value: &str, distance: f32, confidence: f32) -> FieldCandidate {
        FieldCandidate::new(value, confidence, distance, "label", Point::default())
    }

    #[test]
    fn test_more_words_beat_proximity() {
        let candidates = vec![
            candidate("Acme", 5.0, 0.99),
            candidate("Acme Supply Co", 300.0, 0.70),
        ];
        assert_eq!(
            resolve(CanonicalField::SellerName, candidates),
            Some("Acme Supply Co".to_string())
        );
    }

    #[test]
    fn test_single_token_prefers_closest() {
        let candidates = vec![
            candidate("3,644.28", 120.0, 0.99),
            candidate("1,200.00", 40.0, 0.60),
        ];
        assert_eq!(
            resolve(CanonicalField::AmountFinanced, candidates),
            Some("1,200.00".to_string())
        );
    }

    #[test]
    fn test_confidence_breaks_distance_ties() {
        let candidates = vec![candidate("21%", 40.0, 0.60), candidate("12%", 40.0, 0.95)];
        assert_eq!(resolve(CanonicalField::Apr, candidates), Some("12%".to_string()));
    }

    #[test]
    fn test_full_ties_keep_discovery_order() {
        let candidates = vec![
            candidate("Jane Doe", 10.0, 0.9),
            candidate("John Roe", 10.0, 0.9),
        ];
        assert_eq!(
            resolve(CanonicalField::BuyerName, candidates),
            Some("Jane Doe".to_string())
        );
    }

    #[test]
    fn test_trailing_artifacts_and_empty_values() {
        assert_eq!(
            resolve(CanonicalField::SellerCity, vec![candidate("Bristol,", 1.0, 1.0)]),
            Some("Bristol".to_string())
        );
        assert_eq!(resolve(CanonicalField::Quantity, vec![candidate(".;", 1.0, 1.0)]), None);
        assert_eq!(resolve(CanonicalField::Quantity, Vec::new()), None);
    }

    #[test]
    fn test_word_count() {
        assert_eq!(candidate("  123 Main   St ", 0.0, 1.0).word_count(), 3);
    }
}
