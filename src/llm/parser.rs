use regex::Regex;
use serde::de::DeserializeOwned;
use std::sync::OnceLock;
use thiserror::Error;

/// A delegated response could not be interpreted as structured data.
/// Recoverable: the calling stage substitutes a placeholder and continues.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("no JSON found in response, starts with: {snippet}")]
    NoJson { snippet: String },

    #[error("JSON did not match the expected shape: {0}")]
    Shape(#[from] serde_json::Error),
}

fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| Regex::new(r"(?s)```(?:json)?\s*(.+?)\s*```").expect("valid regex"))
}

/// Extract a JSON array from free-form model output.
///
/// Models wrap JSON in markdown fences or prose more often than not, so
/// salvage runs in order: direct parse, fenced block, outermost `[..]` span.
pub fn extract_array<T: DeserializeOwned>(text: &str) -> Result<Vec<T>, ParseError> {
    extract_json(text, '[', ']')
}

/// Extract a JSON object from free-form model output, same salvage order
/// with an outermost `{..}` span as the last resort.
pub fn extract_object<T: DeserializeOwned>(text: &str) -> Result<T, ParseError> {
    extract_json(text, '{', '}')
}

fn extract_json<T: DeserializeOwned>(text: &str, open: char, close: char) -> Result<T, ParseError> {
    let trimmed = text.trim();

    if let Ok(value) = serde_json::from_str(trimmed) {
        return Ok(value);
    }

    if let Some(captures) = fence_regex().captures(trimmed) {
        if let Some(inner) = captures.get(1) {
            if let Ok(value) = serde_json::from_str(inner.as_str()) {
                return Ok(value);
            }
        }
    }

    if let (Some(start), Some(end)) = (trimmed.find(open), trimmed.rfind(close)) {
        if start < end {
            if let Some(span) = trimmed.get(start..end + close.len_utf8()) {
                // Last salvage attempt: surface the shape error rather
                // than masking it behind NoJson.
                return serde_json::from_str(span).map_err(ParseError::from);
            }
        }
    }

    Err(ParseError::NoJson {
        snippet: trimmed.chars().take(200).collect(),
    })
}
