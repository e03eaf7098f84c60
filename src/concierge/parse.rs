//! Backend Output Parsing
//!
//! The backend is expected, but never guaranteed, to return valid JSON.
//! Policy, in order: strict parse of the whole text; then a balanced-bracket
//! scan from the first plausible opening token to recover JSON embedded in
//! prose; then a structured failure. Callers never see a raw parse error.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::error::ConciergeError;

/// One backend-chosen suggestion against the candidate list.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSuggestion {
    #[serde(rename = "bookId")]
    pub book_id: String,
    pub rationale: String,
}

/// Catalog-constrained response shape.
#[derive(Debug, Deserialize)]
pub struct SuggestionPayload {
    #[serde(default)]
    pub title: Option<String>,
    pub suggestions: Vec<RawSuggestion>,
}

/// A book invented by the backend in discovery mode.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveryBook {
    pub title: String,
    pub author: String,
    pub rationale: String,
    #[serde(default)]
    pub year: Option<i32>,
}

/// Discovery-mode response shape.
#[derive(Debug, Deserialize)]
pub struct DiscoveryPayload {
    #[serde(default)]
    pub title: Option<String>,
    pub books: Vec<DiscoveryBook>,
}

/// Book-summary response shape.
#[derive(Debug, Deserialize)]
pub struct SummaryPayload {
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

/// Parses backend text into a typed payload, repairing prose-wrapped JSON if
/// the strict parse fails.
pub fn parse_payload<T: DeserializeOwned>(text: &str) -> Result<T, ConciergeError> {
    if let Ok(parsed) = serde_json::from_str::<T>(text) {
        return Ok(parsed);
    }

    if let Some(embedded) = extract_json(text) {
        debug!("Strict parse failed, recovered embedded JSON block");
        if let Ok(parsed) = serde_json::from_str::<T>(embedded) {
            return Ok(parsed);
        }
    }

    Err(ConciergeError::UnparsableOutput(
        "response text is not recoverable as JSON".to_string(),
    ))
}

/// Balanced-bracket scan: finds the first `{` or `[` and returns the slice up
/// to its matching closer, respecting strings and escapes. Returns `None`
/// when no balanced block exists.
pub fn extract_json(text: &str) -> Option<&str> {
    let start = text.find(['{', '['])?;
    let bytes = text.as_bytes();
    let opener = bytes[start];
    let closer = if opener == b'{' { b'}' } else { b']' };

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match b {
            b'\\' if in_string => escaped = true,
            b'"' => in_string = !in_string,
            _ if in_string => {}
            b'{' | b'[' => depth += 1,
            b'}' | b']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 && b == closer {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}
