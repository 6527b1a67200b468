//! Rule helpers for agreement fields: shared patterns, value-shape
//! validators and the address parser.

pub mod address;
pub mod patterns;
pub mod validators;

pub use address::{parse_address, ParsedAddress};
pub use validators::is_valid_value;

use patterns::{TRAILING_ARTIFACTS, WHITESPACE};

/// Collapse runs of whitespace to single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Strip trailing punctuation left over from OCR (`.`, `,`, `;`, `:`).
pub fn strip_trailing_artifacts(text: &str) -> String {
    TRAILING_ARTIFACTS.replace(text.trim(), "").trim_end().to_string()
}

/// Upper-cased token with trailing punctuation removed, for keyword checks.
pub fn keyword_form(token: &str) -> String {
    token
        .trim()
        .trim_end_matches([':', ',', '.', ';'])
        .to_uppercase()
}
