//! Integration tests for agreement field extraction

use std::path::Path;

use inca_core::agreement::{EnhancementReason, LabelKind, LabelMatcher};
use inca_core::models::SearchConfig;
use inca_core::{
    AgreementExtractor, CanonicalField, ConfigError, DeterministicExtractor, EnhancementPolicy,
    FieldValues, IncaConfig, LabelTable, OcrResult, PositionalIndex, WordToken,
};
use pretty_assertions::assert_eq;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// Helper to create a word centered on (x, y)
fn word(text: &str, x: i32, y: i32) -> WordToken {
    WordToken::from_rect(text, x - 10, y - 5, x + 10, y + 5).with_confidence(0.95)
}

fn document(words: Vec<WordToken>) -> OcrResult {
    OcrResult::from_words(words)
}

fn expected(pairs: &[(CanonicalField, &str)]) -> FieldValues {
    let mut values = FieldValues::new();
    for (field, value) in pairs {
        values.set(*field, Some(value.to_string()));
    }
    values
}

fn extractor() -> DeterministicExtractor {
    init_tracing();
    DeterministicExtractor::with_defaults().unwrap()
}

/// A form with a captioned buyer block, a seller block whose values sit
/// above their captions, and a column of financial terms.
fn full_agreement() -> OcrResult {
    document(vec![
        // Buyer block
        word("Buyer's", 100, 100),
        word("Name:", 160, 100),
        word("Jane", 220, 130),
        word("Q.", 270, 130),
        word("Public", 320, 130),
        word("Buyer's", 100, 200),
        word("Address:", 170, 200),
        word("9", 200, 230),
        word("Elm", 240, 230),
        word("Street", 290, 230),
        word("Bristol,", 200, 260),
        word("PA", 260, 260),
        word("19007", 310, 260),
        word("Phone:", 150, 300),
        word("843-333-4540", 260, 300),
        // Seller block
        word("Acme", 100, 400),
        word("Supply", 160, 400),
        word("Co", 220, 400),
        word("Seller's", 100, 420),
        word("Name", 160, 420),
        word("1901", 100, 520),
        word("Farragut", 160, 520),
        word("Ave,", 220, 520),
        word("Bristol,", 280, 520),
        word("PA", 330, 520),
        word("19007", 380, 520),
        word("Seller's", 100, 540),
        word("Address", 170, 540),
        word("Seller", 100, 600),
        word("Phone:", 160, 600),
        word("215-555-0100", 300, 600),
        // Terms, more than 200px below the seller block
        word("Amount", 100, 900),
        word("Financed:", 180, 900),
        word("$3,644.28", 300, 900),
        word("Finance", 100, 940),
        word("Charge:", 180, 940),
        word("$1,155.72", 300, 940),
        word("APR:", 100, 980),
        word("21%", 300, 980),
        word("Total", 100, 1020),
        word("of", 150, 1020),
        word("Payments:", 200, 1020),
        word("$4,800.00", 300, 1020),
        word("Number", 100, 1060),
        word("of", 160, 1060),
        word("Payments:", 220, 1060),
        word("48", 300, 1060),
        word("Amount", 100, 1100),
        word("of", 160, 1100),
        word("Payments:", 220, 1100),
        word("$100.00", 300, 1100),
        word("Quantity:", 100, 1140),
        word("1", 300, 1140),
        word("Description", 100, 1180),
        word("of", 180, 1180),
        word("Goods:", 240, 1180),
        word("Water", 320, 1180),
        word("Softener", 400, 1180),
        word("Make/Model:", 100, 1220),
        word("Culligan", 220, 1220),
        word("HE", 280, 1220),
    ])
}

// ============================================================================
// End-to-end scenarios
// ============================================================================

#[test]
fn test_shared_seller_anchor_scenario() {
    let ocr = document(vec![
        word("Seller:", 100, 100),
        word("Acme", 170, 100),
        word("Co", 220, 100),
        word("123", 100, 130),
        word("Main", 150, 130),
        word("St", 190, 130),
        word("Springfield", 260, 130),
        word("555-111-2222", 120, 160),
        word("Buyer:", 100, 220),
        word("Jane", 180, 220),
        word("Doe", 230, 220),
    ]);

    let values = extractor().extract(&ocr);
    assert_eq!(
        values,
        expected(&[
            (CanonicalField::SellerName, "Acme Co"),
            (CanonicalField::SellerAddress, "123 Main St Springfield"),
            (CanonicalField::SellerPhoneNumber, "555-111-2222"),
        ])
    );
}

#[test]
fn test_full_agreement() {
    let result = extractor().extract_with_stats(&full_agreement());

    assert_eq!(
        result.values,
        expected(&[
            (CanonicalField::SellerName, "Acme Supply Co"),
            (CanonicalField::SellerAddress, "1901 Farragut Ave, Bristol, PA 19007"),
            (CanonicalField::SellerCity, "Bristol"),
            (CanonicalField::SellerState, "PA"),
            (CanonicalField::SellerZipCode, "19007"),
            (CanonicalField::SellerPhoneNumber, "215-555-0100"),
            (CanonicalField::BuyerName, "Jane Q. Public"),
            (CanonicalField::BuyerAddress, "9 Elm Street Bristol, PA 19007"),
            (CanonicalField::BuyerPhoneNumber, "843-333-4540"),
            (CanonicalField::StreetAddress, "9 Elm Street Bristol, PA 19007"),
            (CanonicalField::PhoneNumber, "843-333-4540"),
            (CanonicalField::Quantity, "1"),
            (CanonicalField::ItemsPurchased, "Water Softener"),
            (CanonicalField::MakeOrModel, "Culligan HE"),
            (CanonicalField::AmountFinanced, "$3,644.28"),
            (CanonicalField::FinanceCharge, "$1,155.72"),
            (CanonicalField::Apr, "21%"),
            (CanonicalField::TotalOfPayments, "$4,800.00"),
            (CanonicalField::NumberOfPayments, "48"),
            (CanonicalField::AmountOfPayments, "$100.00"),
        ])
    );
    assert!(result.label_matches > 0);
    assert!(result.candidates > 0);
}

#[test]
fn test_json_fixture() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/financial_terms.json");
    let ocr = OcrResult::from_file(&path).unwrap();

    let values = extractor().extract(&ocr);
    assert_eq!(
        values,
        expected(&[
            (CanonicalField::Apr, "12.99%"),
            (CanonicalField::FinanceCharge, "$1,155.72"),
        ])
    );

    let decision = EnhancementPolicy::from(&IncaConfig::default().enhancement).decide(&ocr, &values);
    assert!(!decision.needed);
    assert_eq!(decision.reason, EnhancementReason::ConfidenceSufficient);
}

#[test]
fn test_output_json_has_every_field() {
    let values = extractor().extract(&full_agreement());
    let json = values.to_json();
    let object = json.as_object().unwrap();

    assert_eq!(object.len(), CanonicalField::ALL.len());
    assert_eq!(object["apr"], "21%");
    assert!(object["co_buyer_name"].is_null());
}

// ============================================================================
// Testable properties
// ============================================================================

#[test]
fn test_extraction_is_idempotent() {
    let extractor = extractor();
    let ocr = full_agreement();

    let first = extractor.extract(&ocr).to_json().to_string();
    let second = extractor.extract(&ocr).to_json().to_string();
    assert_eq!(first, second);
}

#[test]
fn test_empty_document_resolves_to_nulls() {
    let values = extractor().extract(&OcrResult::empty());
    assert_eq!(values, FieldValues::new());
    assert_eq!(values.resolved_count(), 0);
}

#[test]
fn test_words_without_geometry() {
    let ocr = document(vec![
        WordToken::new("APR:", Vec::new()),
        WordToken::new("21%", Vec::new()),
    ]);
    let values = extractor().extract(&ocr);
    assert_eq!(values.get(CanonicalField::Apr), Some("21%"));
}

#[test]
fn test_empty_words_keep_label_offsets_aligned() {
    let mut words = vec![word("Quantity:", 100, 100), word("7", 200, 100)];
    words.extend((0..6).map(|_| WordToken::new("", Vec::new())));
    words.extend([word("APR:", 100, 300), word("21%", 200, 300)]);
    let ocr = document(words);
    assert_eq!(ocr.full_text, "Quantity: 7       APR: 21%");

    let values = extractor().extract(&ocr);
    assert_eq!(values.get(CanonicalField::Quantity), Some("7"));
    assert_eq!(values.get(CanonicalField::Apr), Some("21%"));
}

#[test]
fn test_seller_anchor_address_stops_at_next_caption() {
    let ocr = document(vec![
        word("Seller:", 100, 100),
        word("Acme", 170, 100),
        word("Co", 220, 100),
        word("123", 100, 130),
        word("Main", 150, 130),
        word("St", 190, 130),
        word("Items:", 100, 400),
        word("Water", 180, 400),
        word("Softener", 260, 400),
    ]);

    let values = extractor().extract(&ocr);
    assert_eq!(values.get(CanonicalField::SellerName), Some("Acme Co"));
    assert_eq!(values.get(CanonicalField::SellerAddress), Some("123 Main St"));
    assert_eq!(values.get(CanonicalField::ItemsPurchased), Some("Water Softener"));
}

#[test]
fn test_same_line_name_needs_two_significant_tokens() {
    // A lone short token on the caption line gives way to the line above.
    let ocr = document(vec![
        word("Acme", 100, 180),
        word("Supply", 160, 180),
        word("Co", 220, 180),
        word("Xy", 100, 200),
        word("Seller's", 300, 200),
        word("Name", 360, 200),
    ]);
    assert_eq!(
        extractor().extract(&ocr).get(CanonicalField::SellerName),
        Some("Acme Supply Co")
    );

    // Two significant tokens keep the caption line even though the line
    // above has more words.
    let ocr = document(vec![
        word("Big", 100, 180),
        word("Other", 160, 180),
        word("Corp", 220, 180),
        word("Inc", 280, 180),
        word("Acme", 100, 200),
        word("Supply", 160, 200),
        word("Seller's", 300, 200),
        word("Name", 360, 200),
    ]);
    assert_eq!(
        extractor().extract(&ocr).get(CanonicalField::SellerName),
        Some("Acme Supply")
    );
}

#[test]
fn test_more_words_win_over_closer_single_word() {
    let ocr = document(vec![
        word("Description:", 100, 100),
        word("Water", 220, 100),
        word("Softener", 300, 100),
        word("System", 380, 100),
    ]);
    let extractor = extractor();

    let candidates = extractor.candidates(&ocr, CanonicalField::ItemsPurchased);
    let closest = candidates
        .iter()
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
        .unwrap();
    assert_eq!(closest.value, "Water");

    assert_eq!(
        extractor.extract_field(&ocr, CanonicalField::ItemsPurchased),
        Some("Water Softener System".to_string())
    );
}

#[test]
fn test_label_words_are_never_candidates() {
    let ocr = document(vec![word("Buyer's", 100, 100), word("Name:", 160, 100)]);
    let extractor = extractor();

    assert!(extractor.candidates(&ocr, CanonicalField::BuyerName).is_empty());
    assert_eq!(extractor.extract(&ocr).get(CanonicalField::BuyerName), None);
}

#[test]
fn test_phone_candidates_by_digit_count() {
    let ocr = document(vec![
        word("Phone:", 100, 100),
        word("333-4540", 180, 100),
        word("8433334540", 300, 100),
    ]);
    assert_eq!(
        extractor().extract(&ocr).get(CanonicalField::BuyerPhoneNumber),
        Some("8433334540")
    );
}

#[test]
fn test_legacy_alias_fills_buyer_fields() {
    let ocr = document(vec![
        word("Address:", 180, 100),
        word("77", 260, 100),
        word("Oak", 300, 100),
        word("Lane", 350, 100),
    ]);
    let values = extractor().extract(&ocr);

    assert_eq!(values.get(CanonicalField::StreetAddress), Some("77 Oak Lane"));
    assert_eq!(values.get(CanonicalField::BuyerAddress), Some("77 Oak Lane"));
}

// ============================================================================
// Label matching
// ============================================================================

#[test]
fn test_label_offsets_map_back_to_words() {
    let ocr = full_agreement();
    let index = PositionalIndex::build(&ocr.word_annotations);
    let matcher = LabelMatcher::new(&LabelTable::default(), &SearchConfig::default()).unwrap();

    for field in CanonicalField::ALL {
        for label in matcher.find_labels(field, &ocr.full_text, &index) {
            assert!(label.anchor.contains_offset(label.start), "{:?}", label);
            assert_eq!(&ocr.full_text[label.start..label.end], label.matched_text);
        }
    }

    let seller = matcher.find_labels(CanonicalField::SellerAddress, &ocr.full_text, &index);
    assert_eq!(seller.len(), 1);
    assert_eq!(seller[0].kind, LabelKind::ValuePrecedes);
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_invalid_label_pattern_fails_at_construction() {
    let mut config = IncaConfig::default();
    config.labels.set(CanonicalField::Apr, &[r"apr\s*("]);

    let err = DeterministicExtractor::new(config).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidPattern { ref field, .. } if field == "apr"));
}

#[test]
fn test_custom_labels_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("layout.json");

    let mut config = IncaConfig::default();
    config.labels.set(CanonicalField::Apr, &[r"interest\s+rate\s*:"]);
    config.save(&path).unwrap();

    let extractor = DeterministicExtractor::new(IncaConfig::from_file(&path).unwrap()).unwrap();
    let ocr = document(vec![
        word("Interest", 100, 100),
        word("Rate:", 170, 100),
        word("9.5%", 260, 100),
    ]);
    assert_eq!(extractor.extract(&ocr).get(CanonicalField::Apr), Some("9.5%"));

    let default = DeterministicExtractor::with_defaults().unwrap();
    assert_eq!(default.extract(&ocr).get(CanonicalField::Apr), None);
}
