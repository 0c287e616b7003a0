//! HTTP client for OpenAI-compatible chat completion endpoints

use std::time::{Duration, Instant};

use reqwest::StatusCode;

use super::models::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, LLMCompletion, LLMError,
};
use crate::config::LlmConfig;

#[derive(Clone)]
pub struct LLMClient {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl LLMClient {
    pub fn new(config: &LlmConfig) -> Result<Self, LLMError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LLMError::ApiError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base)
    }

    pub async fn chat(
        &self,
        messages: Vec<ChatMessage>,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<LLMCompletion, LLMError> {
        let body = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            max_tokens,
            temperature,
        };

        let started = Instant::now();
        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let text = response.text().await.map_err(map_transport_error)?;

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(LLMError::RateLimited(truncate(&text, 200)));
        }
        if !status.is_success() {
            return Err(LLMError::ApiError(format!("HTTP {}: {}", status.as_u16(), truncate(&text, 500))));
        }

        let parsed: ChatCompletionResponse =
            serde_json::from_str(&text).map_err(|e| LLMError::ParseError(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(LLMError::EmptyResponse)?;

        let latency_ms = started.elapsed().as_millis() as u64;
        let usage = parsed.usage.unwrap_or_default();
        tracing::debug!(
            "LLM completion from {} in {}ms ({} tokens)",
            self.model,
            latency_ms,
            usage.total_tokens
        );

        Ok(LLMCompletion { content, usage, latency_ms })
    }
}

fn map_transport_error(err: reqwest::Error) -> LLMError {
    if err.is_timeout() {
        LLMError::Timeout(err.to_string())
    } else {
        LLMError::ApiError(err.to_string())
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
