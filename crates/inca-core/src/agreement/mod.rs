//! Agreement field extraction module.

mod assembler;
mod engine;
mod enhance;
mod labels;
mod proximity;
mod resolver;
pub mod rules;

pub use assembler::{aggregate, Assembler, SHARED_ANCHOR_LABEL};
pub use engine::{DeterministicExtractor, ExtractionResult};
pub use enhance::{
    EnhancedExtractor, EnhancedOutcome, EnhancementDecision, EnhancementPolicy, EnhancementReason,
    Enhancer,
};
pub use labels::{LabelKind, LabelMatch, LabelMatcher};
pub use proximity::{search_nearby, SearchRegion};
pub use resolver::{by_completeness, by_proximity, rank, resolve, FieldCandidate};

use crate::models::FieldValues;
use crate::ocr::OcrResult;

/// Trait for agreement field extractors.
///
/// Extraction never fails: missing labels, empty text or absent geometry
/// leave fields null.
pub trait AgreementExtractor {
    /// Extract every canonical field from an OCR result.
    fn extract(&self, ocr_result: &OcrResult) -> FieldValues;
}
