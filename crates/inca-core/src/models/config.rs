//! Configuration structures for the extraction engine.

use serde::{Deserialize, Serialize};

use super::labels::LabelTable;
use crate::error::ConfigError;

/// Main configuration for the inca extractor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncaConfig {
    /// Label-relative search regions.
    pub search: SearchConfig,

    /// Multi-word value assembly.
    pub assembly: AssemblyConfig,

    /// Thresholds deciding when the result should be enhanced downstream.
    pub enhancement: EnhancementConfig,

    /// Label patterns per field.
    pub labels: LabelTable,
}

/// Geometry of the proximity search, in pixels relative to the label center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// How far left of the label a following value may start.
    pub left_reach: f32,

    /// How far right of the label a following value may sit.
    pub right_reach: f32,

    /// Maximum vertical distance in either direction.
    pub vertical_reach: f32,

    /// How far left a preceding value may sit.
    pub preceding_left_reach: f32,

    /// How far right a preceding value may sit.
    pub preceding_right_reach: f32,

    /// How far below the label a preceding value may sit.
    pub preceding_max_below: f32,

    /// Lower-cased label phrasings whose value is printed before the caption.
    pub preceding_label_phrases: Vec<String>,

    /// Pattern of the shared party anchor ("Seller:") that introduces a
    /// block of name, address and phone in reading order.
    pub shared_anchor: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            left_reach: 50.0,
            right_reach: 500.0,
            vertical_reach: 200.0,
            preceding_left_reach: 500.0,
            preceding_right_reach: 50.0,
            preceding_max_below: 100.0,
            preceding_label_phrases: vec!["seller's name".to_string(), "seller's address".to_string()],
            shared_anchor: r"seller\s*:".to_string(),
        }
    }
}

/// Multi-word assembly windows, limits and vocabularies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyConfig {
    /// Forward walk: words must satisfy `dx > -forward_left_reach`.
    pub forward_left_reach: f32,

    /// Forward walk: vertical window `[min, max]`.
    pub forward_dy: (f32, f32),

    /// Columnar fields: words must satisfy `dx > column_min_dx`.
    pub column_min_dx: f32,

    /// Columnar fields: vertical window `[min, max]`.
    pub column_dy: (f32, f32),

    /// Word cap for names and descriptions.
    pub max_words: usize,

    /// Word cap for addresses.
    pub max_address_words: usize,

    /// Text-offset walk: bytes after the anchor considered.
    pub char_window: usize,

    /// Text-offset walk: wider window for the phone number.
    pub phone_char_window: usize,

    /// Text-offset walk: words scanned for a name.
    pub name_scan_words: usize,

    /// Text-offset walk: words scanned for the start of an address.
    pub address_scan_words: usize,

    /// Backward walk: horizontal reach either side of the label.
    pub preceding_reach: f32,

    /// Backward walk: how far above the label words are considered.
    pub preceding_max_above: f32,

    /// Backward walk: how far below the label a name may sit.
    pub name_max_below: f32,

    /// Backward walk: how far below the label an address may sit.
    pub address_max_below: f32,

    /// Words within this vertical distance share the label's line.
    pub same_line_tolerance: f32,

    /// Band (exclusive) above the label holding a name's line.
    pub name_above_band: (f32, f32),

    /// Band (exclusive) above the label holding an address line.
    pub address_above_band: (f32, f32),

    /// Band (exclusive) below the label holding an address line.
    pub address_below_band: (f32, f32),

    /// Line grouping granularity (y is rounded to a multiple of this).
    pub line_bucket: f32,

    /// Backward walk: word cap for names.
    pub max_name_words: usize,

    /// Backward walk: word cap for an address line.
    pub max_line_address_words: usize,

    /// Backward walk: word cap for same-line address fragments.
    pub max_fragment_words: usize,

    /// A same-line name needs at least this many significant tokens.
    pub min_significant_tokens: usize,

    /// Tokens at least this long count as significant.
    pub significant_token_len: usize,

    /// Upper-case substrings that, together with a colon, mark a label.
    pub label_indicators: Vec<String>,

    /// Upper-case keywords that end a name or address block.
    pub section_keywords: Vec<String>,

    /// Upper-case keywords that end a value in the shared-anchor walk.
    pub anchor_stop_keywords: Vec<String>,

    /// Upper-case keywords that end an address in the shared-anchor walk.
    pub party_boundary_keywords: Vec<String>,

    /// Upper-case caption words skipped in the backward walk.
    pub label_words: Vec<String>,

    /// Tokens that end a value outright.
    pub separators: Vec<String>,

    /// Punctuation-only tokens skipped in the backward walk.
    pub filler_tokens: Vec<String>,

    /// Upper-case street suffixes recognized in same-line address fragments.
    pub street_suffixes: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            forward_left_reach: 50.0,
            forward_dy: (-20.0, 150.0),
            column_min_dx: 50.0,
            column_dy: (0.0, 80.0),
            max_words: 8,
            max_address_words: 15,
            char_window: 500,
            phone_char_window: 600,
            name_scan_words: 10,
            address_scan_words: 20,
            preceding_reach: 500.0,
            preceding_max_above: 300.0,
            name_max_below: 100.0,
            address_max_below: 50.0,
            same_line_tolerance: 5.0,
            name_above_band: (-30.0, -10.0),
            address_above_band: (-40.0, -10.0),
            address_below_band: (10.0, 50.0),
            line_bucket: 5.0,
            max_name_words: 5,
            max_line_address_words: 10,
            max_fragment_words: 8,
            min_significant_tokens: 2,
            significant_token_len: 3,
            label_indicators: strings(&[
                "NAME", "ADDRESS", "PHONE", "QUANTITY", "ITEMS", "AMOUNT", "CHARGE", "APR",
                "PAYMENT", "TOTAL", "MAKE", "MODEL", "FINANCE",
            ]),
            section_keywords: strings(&[
                "PHONE", "ADDRESS", "CO-BUYER", "BUYER", "SELLER", "SIGNING", "AGREEMENT",
            ]),
            anchor_stop_keywords: strings(&["CO-BUYER", "BUYER", "ADDRESS", "PHONE", "QUANTITY"]),
            party_boundary_keywords: strings(&["CO-BUYER", "BUYER", "QUANTITY"]),
            label_words: strings(&["SELLER", "SELLER'S", "NAME", "ADDRESS"]),
            separators: strings(&[":", "|", "\u{2014}", "\u{2013}", "/"]),
            filler_tokens: strings(&[":", ",", "(", ")", "."]),
            street_suffixes: strings(&[
                "AVE", "AVENUE", "ST", "STREET", "ROAD", "RD", "BLVD", "BOULEVARD", "LANE", "LN",
            ]),
        }
    }
}

/// When the deterministic result should be handed to an enhancer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhancementConfig {
    /// Enhance when mean word or block confidence falls below this.
    pub low_mean_confidence: f32,

    /// Enhance when any word's confidence falls below this.
    pub low_word_confidence: f32,

    /// Enhance when more than this share of words is low-confidence.
    pub low_confidence_word_ratio: f32,
}

impl Default for EnhancementConfig {
    fn default() -> Self {
        Self {
            low_mean_confidence: 0.85,
            low_word_confidence: 0.80,
            low_confidence_word_ratio: 0.20,
        }
    }
}

fn invalid(key: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn check_positive(key: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(key, format!("must be positive, got {}", value)))
    }
}

fn check_window(key: &str, (min, max): (f32, f32)) -> Result<(), ConfigError> {
    if min.is_finite() && max.is_finite() && min <= max {
        Ok(())
    } else {
        Err(invalid(key, format!("window [{}, {}] is inverted", min, max)))
    }
}

fn check_unit(key: &str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(key, format!("must be within 0.0 - 1.0, got {}", value)))
    }
}

impl IncaConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check that windows and limits are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let search = &self.search;
        check_positive("search.right_reach", search.right_reach)?;
        check_positive("search.vertical_reach", search.vertical_reach)?;
        check_positive("search.preceding_left_reach", search.preceding_left_reach)?;
        if !(search.left_reach >= 0.0 && search.preceding_right_reach >= 0.0) {
            return Err(invalid("search", "horizontal reaches must not be negative"));
        }
        if search.shared_anchor.trim().is_empty() {
            return Err(invalid("search.shared_anchor", "must not be empty"));
        }

        let assembly = &self.assembly;
        check_window("assembly.forward_dy", assembly.forward_dy)?;
        check_window("assembly.column_dy", assembly.column_dy)?;
        check_window("assembly.name_above_band", assembly.name_above_band)?;
        check_window("assembly.address_above_band", assembly.address_above_band)?;
        check_window("assembly.address_below_band", assembly.address_below_band)?;
        check_positive("assembly.line_bucket", assembly.line_bucket)?;
        check_positive("assembly.preceding_reach", assembly.preceding_reach)?;

        for (key, value) in [
            ("assembly.max_words", assembly.max_words),
            ("assembly.max_address_words", assembly.max_address_words),
            ("assembly.max_name_words", assembly.max_name_words),
            ("assembly.max_line_address_words", assembly.max_line_address_words),
            ("assembly.max_fragment_words", assembly.max_fragment_words),
            ("assembly.char_window", assembly.char_window),
            ("assembly.phone_char_window", assembly.phone_char_window),
        ] {
            if value == 0 {
                return Err(invalid(key, "must be at least 1"));
            }
        }

        let enhancement = &self.enhancement;
        check_unit("enhancement.low_mean_confidence", enhancement.low_mean_confidence)?;
        check_unit("enhancement.low_word_confidence", enhancement.low_word_confidence)?;
        check_unit(
            "enhancement.low_confidence_word_ratio",
            enhancement.low_confidence_word_ratio,
        )?;

        Ok(())
    }
}
