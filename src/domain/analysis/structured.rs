//! Parsing of structured (JSON) payloads out of model responses.
//!
//! Every structured LLM call in the system funnels through these helpers, so
//! all fallback behavior hangs off a single [`ParseFailure`] signal instead
//! of being duplicated per call site.

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Failure to obtain a structured value from a model response.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseFailure {
    #[error("response contained no JSON payload")]
    NoPayload,

    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("payload did not match expected shape: {0}")]
    UnexpectedShape(String),
}

/// Extracts a JSON value from a model response.
///
/// Models frequently wrap JSON in markdown code fences or surround it with
/// prose; this strips a ```json fence (or a bare ``` fence) when present and
/// otherwise parses from the first `{` to the last `}`.
pub fn parse_json_payload(response: &str) -> Result<serde_json::Value, ParseFailure> {
    let candidate = extract_candidate(response).ok_or(ParseFailure::NoPayload)?;
    serde_json::from_str(candidate).map_err(|e| ParseFailure::InvalidJson(e.to_string()))
}

/// Extracts a JSON payload and deserializes it into a typed result.
pub fn parse_typed<T: DeserializeOwned>(response: &str) -> Result<T, ParseFailure> {
    let value = parse_json_payload(response)?;
    serde_json::from_value(value).map_err(|e| ParseFailure::UnexpectedShape(e.to_string()))
}

fn extract_candidate(response: &str) -> Option<&str> {
    let trimmed = response.trim();

    // Fenced block takes priority when present.
    if let Some(fenced) = extract_fenced(trimmed, "```json") {
        return Some(fenced);
    }
    if let Some(fenced) = extract_fenced(trimmed, "```") {
        return Some(fenced);
    }

    // Otherwise take the outermost braces.
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&trimmed[start..=end])
}

fn extract_fenced<'a>(text: &'a str, fence: &str) -> Option<&'a str> {
    let after = text.split_once(fence)?.1;
    let inner = after.split_once("```")?.0;
    let inner = inner.trim();
    if inner.is_empty() {
        None
    } else {
        Some(inner)
    }
}
