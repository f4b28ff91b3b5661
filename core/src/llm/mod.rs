//! LLM client module
//!
//! Provides the chat-completion wire types and the client for the
//! OpenAI-compatible completion service the gateway fronts.

pub mod chat;
pub mod client;

pub use chat::{ChatMessage, ChatRequest, MessageRole};
pub use client::{ChatCompletions, LlmClient, ProxyResponse};
