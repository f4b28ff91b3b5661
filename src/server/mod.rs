//! HTTP layer for the gateway
//!
//! Two POST routes over one shared state: the raw chat proxy and the
//! memory-summary pipeline. Bodies are parsed by hand from bytes so a
//! malformed body yields this service's `invalid_body` error shape rather
//! than the framework's default rejection.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::Value;

use memsum_core::config::Config;
use memsum_core::error::GatewayError;
use memsum_core::llm::{ChatCompletions, LlmClient, ProxyResponse};
use memsum_core::memory::{ExtractionRequest, MemoryPipeline};

/// Shared, immutable per-process state
pub struct AppState {
    pub config: Config,
    pub client: Arc<dyn ChatCompletions>,
    pub pipeline: MemoryPipeline,
}

impl AppState {
    /// Assemble state around an arbitrary collaborator implementation
    pub fn new(config: Config, client: Arc<dyn ChatCompletions>) -> Self {
        let pipeline = MemoryPipeline::new(&config.upstream, client.clone());
        AppState {
            config,
            client,
            pipeline,
        }
    }
}

/// Bind and serve until ctrl-c
pub async fn start_server(config: Config) -> Result<()> {
    let bind = config.server.bind.clone();
    let client = Arc::new(LlmClient::new(config.upstream.clone())?);
    let state = Arc::new(AppState::new(config, client));

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    tracing::info!("memsum gateway listening on http://{bind}");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;
    Ok(())
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/chat", post(chat_proxy))
        .route("/api/memory-summary", post(memory_summary))
        .with_state(state)
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutting down");
}

/// POST /api/chat: forward the body verbatim, relay the reply verbatim
async fn chat_proxy(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    if !state.config.upstream.has_api_key() {
        return error_response(&GatewayError::MissingApiKey);
    }

    let payload: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(_) => return error_response(&GatewayError::InvalidBody),
    };

    match state.client.forward(payload).await {
        Ok(reply) => relay_response(reply),
        Err(err) => error_response(&err),
    }
}

/// POST /api/memory-summary: run the extraction pipeline
async fn memory_summary(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    if !state.config.upstream.has_api_key() {
        return error_response(&GatewayError::MissingApiKey);
    }

    let request: ExtractionRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(_) => return error_response(&GatewayError::InvalidBody),
    };

    match state.pipeline.extract(&request).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(err) => error_response(&err),
    }
}

fn relay_response(reply: ProxyResponse) -> Response {
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY);
    (
        status,
        [(header::CONTENT_TYPE, reply.content_type)],
        reply.body,
    )
        .into_response()
}

fn error_response(err: &GatewayError) -> Response {
    let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::BAD_GATEWAY);
    if status.is_server_error() {
        tracing::warn!(code = err.code(), %err, "request failed");
    }
    (status, Json(err.to_body())).into_response()
}
