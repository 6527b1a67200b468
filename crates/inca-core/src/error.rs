//! Error types for the inca-core library.

use thiserror::Error;

/// Main error type for the inca library.
#[derive(Error, Debug)]
pub enum IncaError {
    /// Configuration error (raised when an extractor is built).
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// OCR input or backend error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Field extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors in the extraction configuration.
///
/// These are programming-time defects: they surface when the extractor is
/// constructed, never while a document is being processed.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A label pattern failed to compile.
    #[error("invalid label pattern for {field} ({pattern:?}): {reason}")]
    InvalidPattern {
        field: String,
        pattern: String,
        reason: String,
    },

    /// The label table names a field outside the canonical set.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// A numeric window or limit makes no sense.
    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

/// Errors related to OCR input.
#[derive(Error, Debug)]
pub enum OcrError {
    /// The OCR backend failed.
    #[error("OCR backend failed: {0}")]
    Backend(String),

    /// The OCR result could not be decoded.
    #[error("invalid OCR input: {0}")]
    InvalidInput(String),
}

/// Errors raised around field extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// An enhancement collaborator failed.
    #[error("enhancement failed: {0}")]
    Enhancement(String),
}

/// Result type for the inca library.
pub type Result<T> = std::result::Result<T, IncaError>;
