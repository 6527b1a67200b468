//! Core library for installment-agreement field extraction.
//!
//! This crate provides:
//! - OCR input models (words, blocks, bounding boxes, confidence)
//! - a positional text index over OCR words
//! - label-driven spatial proximity extraction of the canonical agreement
//!   fields (seller, buyer, co-buyer, purchase and financial terms)
//! - an enhancement decision for handing weak results to a collaborator

pub mod agreement;
pub mod error;
pub mod models;
pub mod ocr;

pub use agreement::{
    AgreementExtractor, DeterministicExtractor, EnhancedExtractor, EnhancementPolicy, Enhancer,
    ExtractionResult, FieldCandidate,
};
pub use error::{ConfigError, ExtractionError, IncaError, OcrError, Result};
pub use models::{CanonicalField, FieldValues, IncaConfig, LabelTable};
pub use ocr::{OcrBackend, OcrResult, PositionalIndex, WordToken};
