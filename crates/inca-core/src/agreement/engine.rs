//! Deterministic extraction: label matching, candidate search and
//! resolution for every canonical field.

use std::collections::BTreeMap;

use tracing::{debug, info, trace};

use crate::error::ConfigError;
use crate::models::{CanonicalField, FieldValues, IncaConfig};
use crate::ocr::{OcrResult, PositionalIndex};

use super::assembler::Assembler;
use super::labels::{LabelKind, LabelMatch, LabelMatcher};
use super::proximity::search_nearby;
use super::resolver::{by_proximity, resolve, FieldCandidate};
use super::rules::parse_address;
use super::AgreementExtractor;

/// Candidates kept per field in [`DeterministicExtractor::candidate_summary`].
const SUMMARY_CANDIDATES: usize = 5;

/// Values plus counters for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionResult {
    pub values: FieldValues,
    /// Label hits across all fields.
    pub label_matches: usize,
    /// Candidates generated across all fields.
    pub candidates: usize,
}

/// One document prepared for searching.
struct Page<'a> {
    text: &'a str,
    index: PositionalIndex<'a>,
}

impl<'a> Page<'a> {
    fn new(ocr: &'a OcrResult) -> Self {
        Self {
            text: &ocr.full_text,
            index: PositionalIndex::build(&ocr.word_annotations),
        }
    }
}

/// Spatial-proximity field extractor.
///
/// Holds only configuration and compiled label patterns; every call builds
/// and discards its own index, so one extractor can serve any number of
/// documents.
#[derive(Debug, Clone)]
pub struct DeterministicExtractor {
    config: IncaConfig,
    matcher: LabelMatcher,
}

impl DeterministicExtractor {
    /// Validate the configuration and compile its label table.
    pub fn new(config: IncaConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let matcher = LabelMatcher::new(&config.labels, &config.search)?;
        Ok(Self { config, matcher })
    }

    /// Extractor with the built-in label table and windows.
    pub fn with_defaults() -> Result<Self, ConfigError> {
        Self::new(IncaConfig::default())
    }

    pub fn config(&self) -> &IncaConfig {
        &self.config
    }

    fn assembler(&self) -> Assembler<'_> {
        Assembler::new(&self.config.assembly)
    }

    fn candidates_for_label<'a>(
        &self,
        field: CanonicalField,
        label: &LabelMatch<'a>,
        page: &Page<'a>,
    ) -> Vec<FieldCandidate> {
        let assembler = self.assembler();

        if label.kind == LabelKind::SharedAnchor {
            return assembler
                .from_text_offset(field, label, &page.index)
                .into_iter()
                .collect();
        }

        let mut candidates = search_nearby(field, label, &page.index, &self.config.search);
        if field.category().assembles() {
            candidates.extend(assembler.forward(field, label, &page.index));
        }
        if label.kind == LabelKind::ValuePrecedes {
            candidates.extend(assembler.backward(field, label, &page.index));
        }
        candidates
    }

    /// Label hit count and all candidates for a field.
    fn field_candidates(&self, field: CanonicalField, page: &Page<'_>) -> (usize, Vec<FieldCandidate>) {
        let labels = self.matcher.find_labels(field, page.text, &page.index);

        let mut candidates = Vec::new();
        for label in &labels {
            candidates.extend(self.candidates_for_label(field, label, page));
        }

        // Seller blocks often carry a single "Seller:" anchor instead of
        // per-field captions.
        if field.is_seller() && candidates.is_empty() {
            if let Some(anchor) = self.matcher.find_shared_anchor(field, page.text, &page.index) {
                trace!("{} falls back to shared anchor at offset {}", field, anchor.start);
                candidates.extend(self.assembler().from_text_offset(field, &anchor, &page.index));
            }
        }

        for candidate in &candidates {
            trace!(
                "{} candidate '{}' (distance: {:.1}, confidence: {:.3}, label: '{}')",
                field, candidate.value, candidate.distance, candidate.confidence, candidate.label
            );
        }

        (labels.len(), candidates)
    }

    /// All candidates for one field, unranked.
    pub fn candidates(&self, ocr: &OcrResult, field: CanonicalField) -> Vec<FieldCandidate> {
        let page = Page::new(ocr);
        self.field_candidates(field, &page).1
    }

    /// Resolve a single field without backfill or aliasing.
    pub fn extract_field(&self, ocr: &OcrResult, field: CanonicalField) -> Option<String> {
        resolve(field, self.candidates(ocr, field))
    }

    /// Extract every field and report how much evidence was found.
    pub fn extract_with_stats(&self, ocr: &OcrResult) -> ExtractionResult {
        let page = Page::new(ocr);
        info!(
            "Extracting agreement fields from {} words ({} characters of text)",
            page.index.len(),
            page.text.len()
        );

        let mut values = FieldValues::new();
        let mut label_matches = 0;
        let mut candidate_count = 0;

        for field in CanonicalField::ALL {
            let (matches, candidates) = self.field_candidates(field, &page);
            label_matches += matches;
            candidate_count += candidates.len();

            let found = candidates.len();
            let value = resolve(field, candidates);
            debug!(
                "{}: {} labels, {} candidates -> {:?}",
                field, matches, found, value
            );
            values.set(field, value);
        }

        backfill_seller_locality(&mut values);
        apply_legacy_aliases(&mut values);

        info!(
            "Resolved {} of {} fields",
            values.resolved_count(),
            CanonicalField::ALL.len()
        );

        ExtractionResult {
            values,
            label_matches,
            candidates: candidate_count,
        }
    }

    /// Up to five candidate values per field, closest first. Context for an
    /// enhancer that re-reads the document.
    pub fn candidate_summary(&self, ocr: &OcrResult) -> BTreeMap<CanonicalField, Vec<String>> {
        let page = Page::new(ocr);
        CanonicalField::ALL
            .into_iter()
            .map(|field| {
                let mut candidates = self.field_candidates(field, &page).1;
                candidates.sort_by(by_proximity);
                let values = candidates
                    .into_iter()
                    .take(SUMMARY_CANDIDATES)
                    .map(|c| c.value)
                    .collect();
                (field, values)
            })
            .collect()
    }
}

impl AgreementExtractor for DeterministicExtractor {
    fn extract(&self, ocr: &OcrResult) -> FieldValues {
        self.extract_with_stats(ocr).values
    }
}

/// Fill empty seller city, state and ZIP from the resolved seller address.
fn backfill_seller_locality(values: &mut FieldValues) {
    let Some(address) = values.get(CanonicalField::SellerAddress).map(str::to_owned) else {
        return;
    };

    let parsed = parse_address(&address);
    for (field, part) in [
        (CanonicalField::SellerCity, parsed.city),
        (CanonicalField::SellerState, parsed.state),
        (CanonicalField::SellerZipCode, parsed.zip_code),
    ] {
        if part.is_some() && !values.is_set(field) {
            debug!("Backfilled {} from seller address: {:?}", field, part);
            values.set(field, part);
        }
    }
}

/// Copy legacy buyer fields forward when the current ones are empty.
fn apply_legacy_aliases(values: &mut FieldValues) {
    for (legacy, current) in [
        (CanonicalField::StreetAddress, CanonicalField::BuyerAddress),
        (CanonicalField::PhoneNumber, CanonicalField::BuyerPhoneNumber),
    ] {
        if values.is_set(current) {
            continue;
        }
        if let Some(value) = values.get(legacy).map(str::to_owned) {
            debug!("Copied {} into {}", legacy, current);
            values.set(current, Some(value));
        }
    }
}
