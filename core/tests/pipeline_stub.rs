//! End-to-end pipeline tests against a scripted completion-service stub.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use memsum_core::config::UpstreamConfig;
use memsum_core::error::{GatewayError, Result};
use memsum_core::llm::{ChatCompletions, ChatRequest, MessageRole, ProxyResponse};
use memsum_core::memory::{prompt::MEMORY_EXTRACTION_SYSTEM, ExtractionRequest, MemoryPipeline};

/// What the stub should answer with
enum Script {
    Content(&'static str),
    Upstream { status: u16, body: &'static str },
    EmptyContent,
}

/// Deterministic collaborator that records every request it sees
struct StubCompletions {
    script: Script,
    calls: AtomicUsize,
    requests: Mutex<Vec<ChatRequest>>,
}

impl StubCompletions {
    fn new(script: Script) -> Arc<Self> {
        Arc::new(StubCompletions {
            script,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatCompletions for StubCompletions {
    async fn complete(&self, request: ChatRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        match &self.script {
            Script::Content(content) => Ok((*content).to_string()),
            Script::Upstream { status, body } => Err(GatewayError::Upstream {
                status: *status,
                body: (*body).to_string(),
            }),
            Script::EmptyContent => Err(GatewayError::EmptyContent),
        }
    }

    async fn forward(&self, body: Value) -> Result<ProxyResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ProxyResponse {
            status: 200,
            content_type: "application/json".to_string(),
            body: body.to_string(),
        })
    }
}

fn valid_request() -> ExtractionRequest {
    serde_json::from_value(serde_json::json!({
        "diaryText": "在海边追浪花，第一次下水游了一小段",
        "location": "青岛",
        "date": "2024-05-01",
        "time_slot": "下午",
        "personality": "活泼",
    }))
    .unwrap()
}

fn pipeline_with(stub: &Arc<StubCompletions>) -> MemoryPipeline {
    MemoryPipeline::new(&UpstreamConfig::default(), stub.clone())
}

#[tokio::test]
async fn minimal_model_output_yields_summary_with_empty_key_facts() {
    let stub = StubCompletions::new(Script::Content(r#"{"summary":"S","emotion":"calm"}"#));
    let pipeline = pipeline_with(&stub);

    let result = pipeline.extract(&valid_request()).await.unwrap();
    assert_eq!(result.summary, "S");
    assert_eq!(result.emotion, "calm");
    assert_eq!(result.key_facts, Vec::<String>::new());

    // The success shape always carries key_facts, even when empty
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["key_facts"], serde_json::json!([]));
}

#[tokio::test]
async fn prose_wrapped_output_is_isolated_and_parsed() {
    let stub = StubCompletions::new(Script::Content(
        r#"Here you go: {"summary":"a","emotion":"calm"} thanks"#,
    ));
    let pipeline = pipeline_with(&stub);

    let result = pipeline.extract(&valid_request()).await.unwrap();
    assert_eq!(result.summary, "a");
    assert_eq!(result.emotion, "calm");
}

#[tokio::test]
async fn key_facts_are_filtered_and_truncated() {
    let stub = StubCompletions::new(Script::Content(
        r#"{"summary":"S","emotion":"calm","key_facts":["a", 2, "b", "c", "d", "e"]}"#,
    ));
    let pipeline = pipeline_with(&stub);

    let result = pipeline.extract(&valid_request()).await.unwrap();
    assert_eq!(result.key_facts, vec!["a", "b", "c", "d"]);
}

#[tokio::test]
async fn missing_required_field_never_reaches_the_collaborator() {
    let stub = StubCompletions::new(Script::Content(r#"{"summary":"S","emotion":"calm"}"#));
    let pipeline = pipeline_with(&stub);

    let mut request = valid_request();
    request.diary_text = None;

    let err = pipeline.extract(&request).await.unwrap_err();
    match err {
        GatewayError::MissingFields(names) => assert!(names.contains("diaryText")),
        other => panic!("expected MissingFields, got {other:?}"),
    }
    assert_eq!(stub.call_count(), 0);
}

#[tokio::test]
async fn upstream_status_and_body_are_relayed() {
    let stub = StubCompletions::new(Script::Upstream {
        status: 429,
        body: "rate limited",
    });
    let pipeline = pipeline_with(&stub);

    let err = pipeline.extract(&valid_request()).await.unwrap_err();
    match err {
        GatewayError::Upstream { status, body } => {
            assert_eq!(status, 429);
            assert_eq!(body, "rate limited");
        }
        other => panic!("expected Upstream, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_content_propagates() {
    let stub = StubCompletions::new(Script::EmptyContent);
    let pipeline = pipeline_with(&stub);

    let err = pipeline.extract(&valid_request()).await.unwrap_err();
    assert!(matches!(err, GatewayError::EmptyContent));
}

#[tokio::test]
async fn bare_refusal_text_is_a_parse_error_with_raw_attached() {
    let stub = StubCompletions::new(Script::Content("I cannot comply"));
    let pipeline = pipeline_with(&stub);

    let err = pipeline.extract(&valid_request()).await.unwrap_err();
    match err {
        GatewayError::Parse { raw } => assert_eq!(raw, "I cannot comply"),
        other => panic!("expected Parse, got {other:?}"),
    }
}

#[tokio::test]
async fn identical_inputs_yield_identical_results() {
    let stub = StubCompletions::new(Script::Content(
        r#"{"summary":"沙滩上追浪花","emotion":"excited","key_facts":["海边","游泳"]}"#,
    ));
    let pipeline = pipeline_with(&stub);

    let request = valid_request();
    let first = pipeline.extract(&request).await.unwrap();
    let second = pipeline.extract(&request).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(stub.call_count(), 2);
}

#[tokio::test]
async fn chat_request_carries_contract_messages_and_model() {
    let stub = StubCompletions::new(Script::Content(r#"{"summary":"S","emotion":"calm"}"#));

    let mut config = UpstreamConfig::default();
    config.memory_model = Some("override/memory-model".to_string());
    let pipeline = MemoryPipeline::new(&config, stub.clone());

    pipeline.extract(&valid_request()).await.unwrap();

    let requests = stub.requests.lock().unwrap();
    let request = &requests[0];
    assert_eq!(request.model, "override/memory-model");
    assert_eq!(request.messages.len(), 2);
    assert_eq!(request.messages[0].role, MessageRole::System);
    assert_eq!(request.messages[0].content, MEMORY_EXTRACTION_SYSTEM);
    assert_eq!(request.messages[1].role, MessageRole::User);
    assert!(request.messages[1].content.starts_with("日记："));
}
