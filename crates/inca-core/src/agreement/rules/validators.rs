//! String-shape checks that prune nearby words before they compete as
//! candidates. Numeric parsing is left to the schema layer.

use crate::models::ValueKind;

use super::patterns::{INTEGER, LETTER, PERCENTAGE, PLAIN_DECIMAL};

/// Number of ASCII digits in a string.
fn digit_count(text: &str) -> usize {
    text.chars().filter(|c| c.is_ascii_digit()).count()
}

/// 10 or 11 digits once separators are stripped.
pub fn is_phone(text: &str) -> bool {
    (10..=11).contains(&digit_count(text))
}

/// A plain decimal number once `$` and `,` are stripped.
pub fn is_currency(text: &str) -> bool {
    let cleaned = text.replace(['$', ','], "");
    PLAIN_DECIMAL.is_match(cleaned.trim())
}

/// Contains a number, optionally followed by `%`.
pub fn is_percentage(text: &str) -> bool {
    PERCENTAGE.is_match(text)
}

pub fn is_integer(text: &str) -> bool {
    INTEGER.is_match(text)
}

/// Contains a letter and is longer than one character.
pub fn is_name(text: &str) -> bool {
    LETTER.is_match(text) && text.chars().count() > 1
}

/// Contains both a digit and a letter.
pub fn is_address(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit()) && LETTER.is_match(text)
}

/// 5 to 9 digits once separators are stripped.
pub fn is_zip(text: &str) -> bool {
    (5..=9).contains(&digit_count(text))
}

/// Check that a word has the shape expected for a field's values.
pub fn is_valid_value(kind: ValueKind, text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() {
        return false;
    }

    match kind {
        ValueKind::Phone => is_phone(text),
        ValueKind::Currency => is_currency(text),
        ValueKind::Percentage => is_percentage(text),
        ValueKind::Integer => is_integer(text),
        ValueKind::PersonName | ValueKind::Locality => is_name(text),
        ValueKind::Address => is_address(text),
        ValueKind::Zip => is_zip(text),
        ValueKind::Text => true,
    }
}
