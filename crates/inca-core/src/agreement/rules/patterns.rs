//! Common regex patterns for agreement field extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Phone numbers as printed on the forms (XXX-XXX-XXXX)
    pub static ref PHONE_PREFIX: Regex = Regex::new(r"^\d{3}-\d{3}-\d{4}").unwrap();

    pub static ref PHONE_EXACT: Regex = Regex::new(r"^\d{3}-\d{3}-\d{4}$").unwrap();

    // Value shapes
    pub static ref PLAIN_DECIMAL: Regex = Regex::new(r"^\d+\.?\d*$").unwrap();

    pub static ref PERCENTAGE: Regex = Regex::new(r"\d+\.?\d*%?").unwrap();

    pub static ref INTEGER: Regex = Regex::new(r"^\d+$").unwrap();

    pub static ref LETTER: Regex = Regex::new(r"[A-Za-z]").unwrap();

    pub static ref LEADING_DIGIT: Regex = Regex::new(r"^\d").unwrap();

    // US address parts
    pub static ref ZIP_CODE: Regex = Regex::new(r"\b(\d{5}(?:-\d{4})?)\b").unwrap();

    pub static ref STATE_CODE: Regex = Regex::new(r"\b([A-Z]{2})\b").unwrap();

    // Value clean-up
    pub static ref EDGE_PUNCTUATION: Regex = Regex::new(r"^[:\s,()]+|[:\s,()]+$").unwrap();

    pub static ref LEADING_PUNCTUATION: Regex = Regex::new(r"^[:,\-\s]+").unwrap();

    pub static ref TRAILING_COLON: Regex = Regex::new(r"\s*:\s*$").unwrap();

    pub static ref TRAILING_ARTIFACTS: Regex = Regex::new(r"[.,;:]+$").unwrap();

    pub static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}
