//! Deciding when the deterministic result should be re-read by an
//! enhancement collaborator, and wiring one in.

use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, info, warn};

use crate::error::ExtractionError;
use crate::models::{CanonicalField, EnhancementConfig, FieldValues};
use crate::ocr::OcrResult;

use super::engine::DeterministicExtractor;
use super::AgreementExtractor;

/// Why enhancement was or was not requested.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnhancementReason {
    /// The caller asked for enhancement unconditionally.
    Forced,
    /// Seller name, address and phone are all empty although the text
    /// mentions a seller.
    SellerFieldsMissing,
    /// Mean word confidence below threshold.
    LowMeanConfidence(f32),
    /// Some word's confidence below threshold.
    LowWordConfidence(f32),
    /// Mean block confidence below threshold.
    LowBlockConfidence(f32),
    /// Too large a share of low-confidence words.
    LowConfidenceRatio(f32),
    /// The OCR backend reported warnings.
    OcrWarnings,
    ConfidenceSufficient,
}

impl fmt::Display for EnhancementReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forced => write!(f, "enhancement forced"),
            Self::SellerFieldsMissing => {
                write!(f, "seller fields missing but seller mentioned in text")
            }
            Self::LowMeanConfidence(v) => write!(f, "low mean word confidence: {:.3}", v),
            Self::LowWordConfidence(v) => write!(f, "low minimum word confidence: {:.3}", v),
            Self::LowBlockConfidence(v) => write!(f, "low mean block confidence: {:.3}", v),
            Self::LowConfidenceRatio(v) => write!(f, "low-confidence word ratio: {:.2}", v),
            Self::OcrWarnings => write!(f, "OCR warnings present"),
            Self::ConfidenceSufficient => write!(f, "OCR confidence sufficient"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnhancementDecision {
    pub needed: bool,
    pub reason: EnhancementReason,
}

impl EnhancementDecision {
    fn needed(reason: EnhancementReason) -> Self {
        Self { needed: true, reason }
    }
}

/// Threshold checks over OCR confidence and extraction completeness.
#[derive(Debug, Clone, PartialEq)]
pub struct EnhancementPolicy {
    config: EnhancementConfig,
    force: bool,
}

impl From<&EnhancementConfig> for EnhancementPolicy {
    fn from(config: &EnhancementConfig) -> Self {
        Self {
            config: config.clone(),
            force: false,
        }
    }
}

impl EnhancementPolicy {
    /// Request enhancement for every document.
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// First matching rule wins.
    pub fn decide(&self, ocr: &OcrResult, values: &FieldValues) -> EnhancementDecision {
        if self.force {
            return EnhancementDecision::needed(EnhancementReason::Forced);
        }

        let seller_missing = [
            CanonicalField::SellerName,
            CanonicalField::SellerAddress,
            CanonicalField::SellerPhoneNumber,
        ]
        .into_iter()
        .all(|f| !values.is_set(f));
        if seller_missing && ocr.full_text.to_lowercase().contains("seller") {
            return EnhancementDecision::needed(EnhancementReason::SellerFieldsMissing);
        }

        let scores = ocr.confidence();
        if let Some(words) = scores.word_level {
            if words.mean < self.config.low_mean_confidence {
                return EnhancementDecision::needed(EnhancementReason::LowMeanConfidence(words.mean));
            }
            if words.min < self.config.low_word_confidence {
                return EnhancementDecision::needed(EnhancementReason::LowWordConfidence(words.min));
            }
        }
        if let Some(blocks) = scores.block_level {
            if blocks.mean < self.config.low_mean_confidence {
                return EnhancementDecision::needed(EnhancementReason::LowBlockConfidence(
                    blocks.mean,
                ));
            }
        }

        let total = ocr.word_annotations.len();
        if total > 0 {
            let low = ocr
                .word_annotations
                .iter()
                .filter(|w| w.confidence.unwrap_or(1.0) < self.config.low_word_confidence)
                .count();
            let ratio = low as f32 / total as f32;
            if ratio > self.config.low_confidence_word_ratio {
                return EnhancementDecision::needed(EnhancementReason::LowConfidenceRatio(ratio));
            }
        }

        if !ocr.warnings.is_empty() {
            return EnhancementDecision::needed(EnhancementReason::OcrWarnings);
        }

        EnhancementDecision {
            needed: false,
            reason: EnhancementReason::ConfidenceSufficient,
        }
    }
}

/// A collaborator that re-reads a document given the deterministic result
/// and the strongest candidates per field.
pub trait Enhancer {
    fn enhance(
        &self,
        ocr: &OcrResult,
        initial: &FieldValues,
        candidates: &BTreeMap<CanonicalField, Vec<String>>,
    ) -> Result<FieldValues, ExtractionError>;
}

/// Result of an enhanced extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct EnhancedOutcome {
    pub values: FieldValues,
    pub decision: EnhancementDecision,
    /// Whether the enhancer's values were used.
    pub enhanced: bool,
}

/// Deterministic extraction with an optional enhancement pass.
pub struct EnhancedExtractor<E> {
    extractor: DeterministicExtractor,
    policy: EnhancementPolicy,
    enhancer: Option<E>,
}

impl<E: Enhancer> EnhancedExtractor<E> {
    pub fn new(extractor: DeterministicExtractor, enhancer: Option<E>) -> Self {
        let policy = EnhancementPolicy::from(&extractor.config().enhancement);
        Self {
            extractor,
            policy,
            enhancer,
        }
    }

    pub fn with_policy(mut self, policy: EnhancementPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn extract_with_outcome(&self, ocr: &OcrResult) -> EnhancedOutcome {
        let values = self.extractor.extract(ocr);
        let decision = self.policy.decide(ocr, &values);

        let Some(enhancer) = self.enhancer.as_ref().filter(|_| decision.needed) else {
            debug!("Keeping deterministic values: {}", decision.reason);
            return EnhancedOutcome {
                values,
                decision,
                enhanced: false,
            };
        };

        warn!("Enhancement needed: {}", decision.reason);
        let candidates = self.extractor.candidate_summary(ocr);
        match enhancer.enhance(ocr, &values, &candidates) {
            Ok(improved) => {
                let changed = CanonicalField::ALL
                    .iter()
                    .filter(|f| improved.get(**f) != values.get(**f))
                    .count();
                info!("Enhancement changed {} fields", changed);
                EnhancedOutcome {
                    values: improved,
                    decision,
                    enhanced: true,
                }
            }
            Err(e) => {
                warn!("Enhancement failed, keeping deterministic values: {}", e);
                EnhancedOutcome {
                    values,
                    decision,
                    enhanced: false,
                }
            }
        }
    }
}

impl<E: Enhancer> AgreementExtractor for EnhancedExtractor<E> {
    fn extract(&self, ocr: &OcrResult) -> FieldValues {
        self.extract_with_outcome(ocr).values
    }
}
