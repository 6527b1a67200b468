//! OCR input contract.
//!
//! The OCR backend itself lives outside this crate; these types describe what
//! it hands over: the concatenated text plus per-word geometry and confidence.

mod index;

pub use index::{IndexedWord, Point, PositionalIndex};

use serde::{Deserialize, Serialize};

use crate::error::OcrError;

/// One corner of a bounding polygon, in integer pixel coordinates.
///
/// OCR backends omit zero-valued coordinates, so both axes default to 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vertex {
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
}

impl Vertex {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A single recognized word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordToken {
    /// Recognized text.
    pub text: String,

    /// Bounding polygon (normally the 4 corners, clockwise from top-left).
    #[serde(default)]
    pub bounding_box: Vec<Vertex>,

    /// Recognition confidence (0.0 - 1.0), if the backend reported one.
    #[serde(default)]
    pub confidence: Option<f32>,
}

impl WordToken {
    /// Create a word from its text and bounding polygon.
    pub fn new(text: impl Into<String>, bounding_box: Vec<Vertex>) -> Self {
        Self {
            text: text.into(),
            bounding_box,
            confidence: None,
        }
    }

    /// Create a word from an axis-aligned rectangle (left, top, right, bottom).
    pub fn from_rect(text: impl Into<String>, left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self::new(
            text,
            vec![
                Vertex::new(left, top),
                Vertex::new(right, top),
                Vertex::new(right, bottom),
                Vertex::new(left, bottom),
            ],
        )
    }

    /// Set the recognition confidence.
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Mean of the bounding polygon's corners; (0, 0) when there is no polygon.
    pub fn center(&self) -> Point {
        if self.bounding_box.is_empty() {
            return Point::default();
        }
        let n = self.bounding_box.len() as f32;
        let x = self.bounding_box.iter().map(|v| v.x as f32).sum::<f32>() / n;
        let y = self.bounding_box.iter().map(|v| v.y as f32).sum::<f32>() / n;
        Point::new(x, y)
    }
}

/// A block-level annotation (paragraph group) from the OCR backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockToken {
    pub text: String,

    #[serde(default)]
    pub bounding_box: Vec<Vertex>,

    /// Mean confidence of the block's words.
    #[serde(default)]
    pub confidence: Option<f32>,

    /// Backend block type (TEXT, TABLE, PICTURE, ...).
    #[serde(default)]
    pub block_type: String,
}

/// Aggregate confidence over a set of annotations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceStats {
    pub mean: f32,
    pub min: f32,
    pub max: f32,
}

impl ConfidenceStats {
    /// Compute stats over the given values; `None` when there are none.
    pub fn from_values(values: impl IntoIterator<Item = f32>) -> Option<Self> {
        let mut count = 0usize;
        let mut sum = 0.0f32;
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;

        for value in values {
            count += 1;
            sum += value;
            min = min.min(value);
            max = max.max(value);
        }

        (count > 0).then(|| Self {
            mean: sum / count as f32,
            min,
            max,
        })
    }
}

/// Word-level and block-level confidence summaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceScores {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_level: Option<ConfidenceStats>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_level: Option<ConfidenceStats>,
}

impl ConfidenceScores {
    /// Summarize the confidences present on the given annotations.
    pub fn from_annotations(words: &[WordToken], blocks: &[BlockToken]) -> Self {
        Self {
            word_level: ConfidenceStats::from_values(words.iter().filter_map(|w| w.confidence)),
            block_level: ConfidenceStats::from_values(blocks.iter().filter_map(|b| b.confidence)),
        }
    }
}

/// Everything the OCR backend produced for one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrResult {
    /// The backend's concatenation of all detected words.
    #[serde(default)]
    pub full_text: String,

    /// Words in the backend's reading order.
    #[serde(default)]
    pub word_annotations: Vec<WordToken>,

    /// Block-level annotations.
    #[serde(default)]
    pub block_annotations: Vec<BlockToken>,

    /// Aggregate confidence, used only by the enhancement decision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_scores: Option<ConfidenceScores>,

    /// Backend warnings.
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl OcrResult {
    /// Create an empty result.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a result from words alone, joining them with single spaces the
    /// way the positional index expects.
    pub fn from_words(words: Vec<WordToken>) -> Self {
        let full_text = words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let confidence_scores = Some(ConfidenceScores::from_annotations(&words, &[]));

        Self {
            full_text,
            word_annotations: words,
            block_annotations: Vec::new(),
            confidence_scores,
            warnings: Vec::new(),
        }
    }

    /// Decode an OCR result from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, OcrError> {
        serde_json::from_str(json).map_err(|e| OcrError::InvalidInput(e.to_string()))
    }

    /// Load an OCR result from a JSON file.
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }

    /// Number of word annotations.
    pub fn word_count(&self) -> usize {
        self.word_annotations.len()
    }

    /// Confidence scores as reported, or computed from the annotations.
    pub fn confidence(&self) -> ConfidenceScores {
        self.confidence_scores.unwrap_or_else(|| {
            ConfidenceScores::from_annotations(&self.word_annotations, &self.block_annotations)
        })
    }
}

/// An OCR backend turning image bytes into word annotations.
pub trait OcrBackend {
    /// Recognize text in an encoded image (PNG or JPEG).
    fn recognize(&self, image: &[u8]) -> Result<OcrResult, OcrError>;
}
