//! Memory extraction pipeline
//!
//! Turns a diary entry plus contextual metadata into a validated
//! `{summary, emotion, key_facts}` record by delegating free-text
//! extraction to the completion service and deterministically parsing the
//! result.

pub mod extract;
pub mod pipeline;
pub mod prompt;

pub use pipeline::MemoryPipeline;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{GatewayError, Result};

/// Caller-supplied inputs for one extraction
///
/// The five required fields must be present and non-empty; emptiness is a
/// validation failure, not a default. Numeric optionals are kept only when
/// the JSON value is actually a number, so zero stays distinct from absent
/// and a stray string is ignored rather than failing the body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractionRequest {
    #[serde(default, rename = "diaryText")]
    pub diary_text: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time_slot: Option<String>,
    #[serde(default)]
    pub personality: Option<String>,

    #[serde(default)]
    pub last_summary: Option<String>,
    #[serde(default)]
    pub nfc_source: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub checkin_frequency: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub interaction_frequency: Option<f64>,
}

/// Borrowed view of the validated required fields
#[derive(Debug, Clone, Copy)]
pub struct RequiredFields<'a> {
    pub diary_text: &'a str,
    pub location: &'a str,
    pub date: &'a str,
    pub time_slot: &'a str,
    pub personality: &'a str,
}

impl ExtractionRequest {
    /// Validate required-field presence and return the validated view
    ///
    /// The error lists every missing field by its wire name, in schema
    /// order.
    pub fn required(&self) -> Result<RequiredFields<'_>> {
        fn field<'a>(
            value: &'a Option<String>,
            name: &'static str,
            missing: &mut Vec<&'static str>,
        ) -> &'a str {
            match value.as_deref().filter(|v| !v.is_empty()) {
                Some(v) => v,
                None => {
                    missing.push(name);
                    ""
                }
            }
        }

        let mut missing = Vec::new();

        let fields = RequiredFields {
            diary_text: field(&self.diary_text, "diaryText", &mut missing),
            location: field(&self.location, "location", &mut missing),
            date: field(&self.date, "date", &mut missing),
            time_slot: field(&self.time_slot, "time_slot", &mut missing),
            personality: field(&self.personality, "personality", &mut missing),
        };

        if missing.is_empty() {
            Ok(fields)
        } else {
            Err(GatewayError::MissingFields(missing.join(", ")))
        }
    }

    /// Whether any optional contextual field is present
    pub fn has_context(&self) -> bool {
        self.last_summary.as_deref().is_some_and(|s| !s.is_empty())
            || self.nfc_source.as_deref().is_some_and(|s| !s.is_empty())
            || self.checkin_frequency.is_some()
            || self.interaction_frequency.is_some()
    }
}

/// Accept a number, treat any other JSON value as absent
fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Value::as_f64))
}

/// Validated, normalized extraction output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemorySummary {
    /// First-person summary of the memory (30 to 50 chars by prompt contract)
    pub summary: String,
    /// One of excited/tender/curious/nostalgic/calm by prompt contract;
    /// not runtime-enforced beyond presence
    pub emotion: String,
    /// Up to four short retrieval keywords
    pub key_facts: Vec<String>,
}
