//! Prompt construction for memory extraction
//!
//! The user prompt is a single ordered text block; its line order is a
//! contract with the system instruction and must not change.

use crate::error::Result;
use crate::llm::{ChatMessage, ChatRequest};

use super::ExtractionRequest;

/// System instruction for the extraction call
///
/// The output contract (strict JSON, emotion enumeration, key_facts
/// cardinality) lives here; the gateway enforces only presence of summary
/// and emotion at runtime.
pub const MEMORY_EXTRACTION_SYSTEM: &str = "\
你是一个记忆抽取器，从宠物旅行日记中提取一条可检索的记忆摘要。
只输出 JSON：{\"summary\":\"...\",\"emotion\":\"...\",\"key_facts\":[\"...\"]}，不要其他文字。
summary 30～50 字，第一人称，描述宠物在该地的具体表现或感受；emotion 从 excited/tender/curious/nostalgic/calm 中选一。
key_facts 为 2～4 个简短关键词，便于后续检索匹配。
只抽取具体行为/感受，可含当地特色；不抽取泛泛的模板句。";

/// Build the user prompt for one extraction request
///
/// Validates required-field presence first, so a bad request never reaches
/// prompt construction (or the network). Line order is fixed: diary,
/// location/time/personality, then each optional context line in schema
/// order, then the context-priority instruction (only when any context line
/// was emitted), then the trailing instruction.
pub fn build_user_prompt(request: &ExtractionRequest) -> Result<String> {
    let fields = request.required()?;

    let mut lines = Vec::new();
    lines.push(format!("日记：{}", fields.diary_text));
    lines.push(format!(
        "地点：{} | 时间：{} | 性格：{}",
        fields.location, fields.time_slot, fields.personality
    ));

    if let Some(last_summary) = request.last_summary.as_deref().filter(|s| !s.is_empty()) {
        lines.push(format!("最近一次相关旅行记忆摘要：{last_summary}"));
    }
    if let Some(nfc_source) = request.nfc_source.as_deref().filter(|s| !s.is_empty()) {
        lines.push(format!("NFC 来源：{nfc_source}"));
    }
    if let Some(freq) = request.checkin_frequency {
        lines.push(format!("打卡频率：{freq}"));
    }
    if let Some(freq) = request.interaction_frequency {
        lines.push(format!("互动频率：{freq}"));
    }

    if request.has_context() {
        lines.push("以上补充信息仅供参考，请以日记内容为主。".to_string());
    }
    lines.push("请抽取一条记忆。".to_string());

    Ok(lines.join("\n"))
}

/// Assemble the full chat request for the extraction call
pub fn build_chat_request(model: &str, request: &ExtractionRequest) -> Result<ChatRequest> {
    let user_prompt = build_user_prompt(request)?;
    Ok(ChatRequest::new(
        model,
        vec![
            ChatMessage::system(MEMORY_EXTRACTION_SYSTEM),
            ChatMessage::user(user_prompt),
        ],
    ))
}
