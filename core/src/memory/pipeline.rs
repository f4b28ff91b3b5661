//! Extraction pipeline orchestration
//!
//! Stateless per-request flow: validate → build prompt → one awaited
//! upstream call → parse and normalize. No retries; transient upstream
//! failures surface as typed errors for the caller.

use std::sync::Arc;

use crate::config::UpstreamConfig;
use crate::error::Result;
use crate::llm::ChatCompletions;

use super::{extract, prompt, ExtractionRequest, MemorySummary};

/// Memory extraction pipeline
///
/// Holds the model choice and the completion-service seam; both are fixed
/// at construction so concurrent invocations share nothing mutable.
pub struct MemoryPipeline {
    model: String,
    client: Arc<dyn ChatCompletions>,
}

impl MemoryPipeline {
    /// Create a pipeline from upstream configuration and a client
    pub fn new(config: &UpstreamConfig, client: Arc<dyn ChatCompletions>) -> Self {
        MemoryPipeline {
            model: config.memory_model().to_string(),
            client,
        }
    }

    /// The model identifier used for extraction calls
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Run one extraction
    ///
    /// Request validation happens before the chat request is built, so an
    /// invalid request never reaches the network.
    pub async fn extract(&self, request: &ExtractionRequest) -> Result<MemorySummary> {
        let chat = prompt::build_chat_request(&self.model, request)?;
        let content = self.client.complete(chat).await?;

        tracing::debug!(chars = content.len(), "parsing model output");
        extract::parse_summary(&content)
    }
}
