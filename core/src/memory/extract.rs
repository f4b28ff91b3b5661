//! Embedded-JSON extraction and output validation
//!
//! Model output is not guaranteed to be pure JSON: it may be wrapped in
//! explanatory prose. The extractor slices from the first `{` to the last
//! `}` of the trimmed output and strict-parses the candidate. Braces inside
//! string literals in the surrounding prose are not handled; this is a
//! best-effort heuristic by contract.

use serde_json::Value;

use crate::error::{GatewayError, Result};

use super::MemorySummary;

/// Maximum number of key facts kept after filtering
pub const MAX_KEY_FACTS: usize = 4;

/// Locate the JSON candidate inside free-form model output
///
/// Falls back to the whole trimmed text when no brace pair is found, so a
/// clean JSON answer and a brace-less answer both flow into the same parse.
fn json_candidate(content: &str) -> &str {
    let trimmed = content.trim();
    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(first), Some(last)) if last > first => &trimmed[first..=last],
        _ => trimmed,
    }
}

/// Parse and normalize model output into a [`MemorySummary`]
///
/// `summary` and `emotion` must both be present as non-empty strings or the
/// whole call fails; partial results are never returned. `key_facts` is
/// lenient: absent or mis-typed yields an empty list, non-string entries are
/// dropped, and the list is truncated to [`MAX_KEY_FACTS`] survivors.
pub fn parse_summary(content: &str) -> Result<MemorySummary> {
    let candidate = json_candidate(content);
    let parsed: Value = serde_json::from_str(candidate).map_err(|_| GatewayError::Parse {
        raw: content.to_string(),
    })?;

    let summary = parsed
        .get("summary")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty());
    let emotion = parsed
        .get("emotion")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty());

    let (Some(summary), Some(emotion)) = (summary, emotion) else {
        return Err(GatewayError::MissingOutputFields);
    };

    let key_facts = parsed
        .get("key_facts")
        .and_then(Value::as_array)
        .map(|facts| {
            facts
                .iter()
                .filter_map(Value::as_str)
                .take(MAX_KEY_FACTS)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Ok(MemorySummary {
        summary: summary.to_string(),
        emotion: emotion.to_string(),
        key_facts,
    })
}
