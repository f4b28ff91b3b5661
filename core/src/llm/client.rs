//! LLM client implementation
//!
//! Talks to an OpenAI-compatible chat-completion endpoint (OpenRouter by
//! default). The [`ChatCompletions`] trait is the seam between the gateway
//! and the network so tests can substitute a deterministic stub.

use super::chat::{ChatCompletion, ChatRequest};
use crate::config::UpstreamConfig;
use crate::error::{GatewayError, Result};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde_json::Value;

/// Attribution title sent to OpenRouter with every request
const APP_TITLE: &str = "Memsum Memory Gateway";

/// Relayed upstream reply for the raw proxy path
#[derive(Debug, Clone)]
pub struct ProxyResponse {
    /// Upstream HTTP status
    pub status: u16,
    /// Upstream Content-Type header
    pub content_type: String,
    /// Upstream body, verbatim
    pub body: String,
}

/// Access to the completion service
///
/// Both methods require a configured API key and perform exactly one
/// upstream call; transient failures surface as typed errors for the
/// caller to retry.
#[async_trait]
pub trait ChatCompletions: Send + Sync {
    /// Send a chat request and return the first choice's message content
    async fn complete(&self, request: ChatRequest) -> Result<String>;

    /// Forward an arbitrary JSON body verbatim and relay the reply
    async fn forward(&self, body: Value) -> Result<ProxyResponse>;
}

/// Completion service client
pub struct LlmClient {
    config: UpstreamConfig,
    http_client: HttpClient,
}

impl LlmClient {
    /// Create a new client
    pub fn new(config: UpstreamConfig) -> anyhow::Result<Self> {
        let http_client = HttpClient::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(LlmClient {
            config,
            http_client,
        })
    }

    fn api_key(&self) -> Result<&str> {
        self.config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(GatewayError::MissingApiKey)
    }

    async fn post_completions<T: serde::Serialize>(
        &self,
        body: &T,
    ) -> Result<(u16, String, String)> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let api_key = self.api_key()?;

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(api_key)
            .header("X-Title", APP_TITLE)
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/json")
            .to_string();
        let raw = response
            .text()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        tracing::debug!(status, bytes = raw.len(), "completion service reply");
        Ok((status, content_type, raw))
    }
}

#[async_trait]
impl ChatCompletions for LlmClient {
    async fn complete(&self, request: ChatRequest) -> Result<String> {
        tracing::debug!(model = %request.model, "sending chat completion");
        let (status, _content_type, raw) = self.post_completions(&request).await?;
        content_from_response(status, &raw)
    }

    async fn forward(&self, body: Value) -> Result<ProxyResponse> {
        let (status, content_type, raw) = self.post_completions(&body).await?;
        Ok(ProxyResponse {
            status,
            content_type,
            body: raw,
        })
    }
}

/// Classify an upstream reply and extract the message content
///
/// Non-success statuses relay the upstream status and body; success bodies
/// must parse as the documented envelope and carry a non-empty string
/// content.
fn content_from_response(status: u16, raw: &str) -> Result<String> {
    if !(200..300).contains(&status) {
        return Err(GatewayError::Upstream {
            status,
            body: raw.to_string(),
        });
    }

    let envelope: ChatCompletion =
        serde_json::from_str(raw).map_err(|_| GatewayError::UpstreamEnvelope)?;

    match envelope.first_content() {
        Some(content) if !content.is_empty() => Ok(content.to_string()),
        _ => Err(GatewayError::EmptyContent),
    }
}
