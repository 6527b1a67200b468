//! Composite address decomposition.
//!
//! Approximates US "Street, City, ST ZIP" formatting. Shapes that deviate
//! (no commas, state spelled out, ZIP before the state) yield partial or
//! empty results rather than guesses.

use super::patterns::{STATE_CODE, ZIP_CODE};

/// Number of trailing characters searched for the state code.
const STATE_TAIL_CHARS: usize = 10;

/// City, state and ZIP recovered from an address line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedAddress {
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
}

/// The last `n` characters of a string.
fn tail_chars(s: &str, n: usize) -> &str {
    let count = s.chars().count();
    if count <= n {
        return s;
    }
    let start = s
        .char_indices()
        .nth(count - n)
        .map_or(0, |(i, _)| i);
    &s[start..]
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

/// Split an address into city, state and ZIP.
pub fn parse_address(address: &str) -> ParsedAddress {
    if address.trim().is_empty() {
        return ParsedAddress::default();
    }

    let zip = ZIP_CODE.captures(address).and_then(|c| c.get(1));
    let zip_code = zip.map(|m| m.as_str().to_string());

    let without_zip = match zip {
        Some(m) => address[..m.start()].trim(),
        None => address,
    };

    let state = STATE_CODE
        .captures(tail_chars(without_zip, STATE_TAIL_CHARS))
        .map(|c| c[1].to_string());

    let city = match &state {
        Some(state) => {
            let parts: Vec<&str> = without_zip.split(',').map(str::trim).collect();
            if parts.len() >= 2 {
                // The state code occasionally lands in the city segment.
                let city = parts[parts.len() - 2]
                    .split_whitespace()
                    .filter(|token| *token != state.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                non_empty(&city)
            } else {
                None
            }
        }
        None => without_zip
            .rsplit_once(',')
            .and_then(|(_, city)| non_empty(city)),
    };

    ParsedAddress {
        city,
        state,
        zip_code,
    }
}
