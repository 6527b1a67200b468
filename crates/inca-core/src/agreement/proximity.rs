//! Proximity candidate search around a label.

use tracing::trace;

use crate::models::{CanonicalField, SearchConfig};
use crate::ocr::PositionalIndex;

use super::labels::{LabelKind, LabelMatch};
use super::resolver::FieldCandidate;
use super::rules::is_valid_value;

/// Rectangle relative to a label center; bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchRegion {
    pub min_dx: f32,
    pub max_dx: f32,
    pub min_dy: f32,
    pub max_dy: f32,
}

impl SearchRegion {
    /// Values to the right of or below the label.
    pub fn following(config: &SearchConfig) -> Self {
        Self {
            min_dx: -config.left_reach,
            max_dx: config.right_reach,
            min_dy: -config.vertical_reach,
            max_dy: config.vertical_reach,
        }
    }

    /// Values printed before the label: left of it, above it, or only a
    /// little below.
    pub fn preceding(config: &SearchConfig) -> Self {
        Self {
            min_dx: -config.preceding_left_reach,
            max_dx: config.preceding_right_reach,
            min_dy: -config.vertical_reach,
            max_dy: config.preceding_max_below,
        }
    }

    pub fn for_label(kind: LabelKind, config: &SearchConfig) -> Self {
        match kind {
            LabelKind::ValuePrecedes => Self::preceding(config),
            LabelKind::Caption | LabelKind::SharedAnchor => Self::following(config),
        }
    }

    pub fn contains(&self, dx: f32, dy: f32) -> bool {
        (self.min_dx..=self.max_dx).contains(&dx) && (self.min_dy..=self.max_dy).contains(&dy)
    }
}

/// Single words in the label's search region that have the field's value
/// shape. Words belonging to the label itself are never candidates.
pub fn search_nearby(
    field: CanonicalField,
    label: &LabelMatch<'_>,
    index: &PositionalIndex<'_>,
    config: &SearchConfig,
) -> Vec<FieldCandidate> {
    let region = SearchRegion::for_label(label.kind, config);
    let origin = label.anchor.center;
    let kind = field.profile().kind;

    index
        .iter()
        .filter(|word| !label.covers(word))
        .filter_map(|word| {
            let (dx, dy) = word.center.offset_from(origin);
            if !region.contains(dx, dy) || !is_valid_value(kind, word.text) {
                return None;
            }
            let candidate = FieldCandidate::new(
                word.text.trim(),
                word.confidence,
                word.center.distance_to(origin),
                label.matched_text,
                word.center,
            );
            trace!(
                "{} candidate '{}' at {:.1}px (confidence: {:.3})",
                field, candidate.value, candidate.distance, candidate.confidence
            );
            Some(candidate)
        })
        .collect()
}
