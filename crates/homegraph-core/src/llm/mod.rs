//! LLM integration - OpenRouter API
//!
//! This module provides:
//! - The `TextCompleter` seam used by the answer engine
//! - An OpenRouter HTTP client implementing it
//! - Request/response types matching the OpenAI-compatible API

mod client;
mod completer;
mod types;

pub use client::{LlmClient, LlmClientBuilder};
pub use completer::TextCompleter;
pub use types::{
    ChatRequest, ChatResponse, Choice, FinishReason, LlmResponse, Message, MessageRole, Usage,
};
