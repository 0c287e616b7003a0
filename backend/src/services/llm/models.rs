//! LLM wire types and errors

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Scenarios
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LLMScenario {
    BookSummary,
    ReviewDigest,
}

impl LLMScenario {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BookSummary => "book_summary",
            Self::ReviewDigest => "review_digest",
        }
    }
}

// ============================================================================
// Chat completion (OpenAI-compatible)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

/// Text returned by the provider plus bookkeeping
#[derive(Debug, Clone)]
pub struct LLMCompletion {
    pub content: String,
    pub usage: TokenUsage,
    pub latency_ms: u64,
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Error, Debug)]
pub enum LLMError {
    #[error("LLM service is not configured")]
    NotConfigured,

    #[error("Rate limited by provider: {0}")]
    RateLimited(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Provider API error: {0}")]
    ApiError(String),

    #[error("Failed to parse provider response: {0}")]
    ParseError(String),

    #[error("Provider returned an empty response")]
    EmptyResponse,
}
