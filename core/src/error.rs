//! Structured error types for the gateway
//!
//! Every failure the pipeline can produce is terminal: nothing here is
//! retried internally, and each variant maps to exactly one wire
//! discriminator and HTTP status so callers can implement their own retry
//! policy.

use serde_json::{json, Value};
use thiserror::Error;

/// Primary error type for gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Upstream API key absent from configuration; never reaches upstream
    #[error("upstream API key is not configured")]
    MissingApiKey,

    /// Caller's request body is not parseable JSON
    #[error("request body must be valid JSON")]
    InvalidBody,

    /// Required extraction inputs absent or empty
    #[error("missing required fields: {0}")]
    MissingFields(String),

    /// Transport-level failure reaching the completion service
    #[error("failed to reach completion service: {0}")]
    Network(String),

    /// Completion service responded with a non-success status
    #[error("completion service returned status {status}")]
    Upstream { status: u16, body: String },

    /// Completion service success body is not its documented envelope
    #[error("failed to parse completion service response")]
    UpstreamEnvelope,

    /// Envelope parsed but the message content is missing or not a string
    #[error("model returned empty content")]
    EmptyContent,

    /// Extracted JSON candidate failed strict parsing
    #[error("failed to parse model JSON output")]
    Parse { raw: String },

    /// Parsed model output lacks a non-empty summary or emotion
    #[error("model output must contain summary and emotion")]
    MissingOutputFields,
}

impl GatewayError {
    /// Machine-readable discriminator carried in every error response
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingApiKey => "missing_api_key",
            Self::InvalidBody => "invalid_body",
            Self::MissingFields(_) => "missing_fields",
            Self::Network(_) => "network_error",
            Self::Upstream { .. } => "upstream_error",
            Self::UpstreamEnvelope => "upstream_invalid_json",
            Self::EmptyContent => "empty_content",
            Self::Parse { .. } => "parse_error",
            Self::MissingOutputFields => "missing_fields_in_model_output",
        }
    }

    /// HTTP status for the error response
    ///
    /// Upstream errors relay the collaborator's own status so callers can
    /// diagnose rate limits and auth failures directly.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MissingApiKey => 503,
            Self::InvalidBody | Self::MissingFields(_) => 400,
            Self::Upstream { status, .. } => *status,
            Self::Network(_)
            | Self::UpstreamEnvelope
            | Self::EmptyContent
            | Self::Parse { .. }
            | Self::MissingOutputFields => 502,
        }
    }

    /// Response body for the error
    ///
    /// `upstream_error` carries the upstream status; `parse_error` carries
    /// the raw model text for debugging (the upstream text is not sensitive).
    pub fn to_body(&self) -> Value {
        let mut body = json!({
            "error": self.code(),
            "message": self.to_string(),
        });
        match self {
            Self::Upstream { status, body: raw } => {
                body["status"] = json!(status);
                body["message"] = json!(raw);
            }
            Self::Parse { raw } => {
                body["raw"] = json!(raw);
            }
            _ => {}
        }
        body
    }
}

/// Result type alias using GatewayError
pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_and_statuses() {
        assert_eq!(GatewayError::MissingApiKey.code(), "missing_api_key");
        assert_eq!(GatewayError::MissingApiKey.status_code(), 503);

        assert_eq!(GatewayError::InvalidBody.status_code(), 400);
        assert_eq!(
            GatewayError::MissingFields("diaryText".to_string()).status_code(),
            400
        );

        let upstream = GatewayError::Upstream {
            status: 429,
            body: "rate limited".to_string(),
        };
        assert_eq!(upstream.code(), "upstream_error");
        assert_eq!(upstream.status_code(), 429);

        assert_eq!(GatewayError::EmptyContent.status_code(), 502);
        assert_eq!(GatewayError::MissingOutputFields.status_code(), 502);
    }

    #[test]
    fn test_upstream_body_relays_status_and_text() {
        let err = GatewayError::Upstream {
            status: 429,
            body: "rate limited".to_string(),
        };
        let body = err.to_body();
        assert_eq!(body["error"], "upstream_error");
        assert_eq!(body["status"], 429);
        assert_eq!(body["message"], "rate limited");
    }

    #[test]
    fn test_parse_error_carries_raw_model_text() {
        let err = GatewayError::Parse {
            raw: "I cannot comply".to_string(),
        };
        let body = err.to_body();
        assert_eq!(body["error"], "parse_error");
        assert_eq!(body["raw"], "I cannot comply");
    }

    #[test]
    fn test_missing_fields_lists_names() {
        let err = GatewayError::MissingFields("diaryText, location".to_string());
        assert!(err.to_string().contains("diaryText, location"));
        assert_eq!(err.to_body()["error"], "missing_fields");
    }
}
