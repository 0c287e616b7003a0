//! LLM service abstraction

use async_trait::async_trait;

use super::client::LLMClient;
use super::models::{ChatMessage, LLMCompletion, LLMError, LLMScenario};
use crate::config::LlmConfig;

/// A prompt built for one scenario
pub trait LLMPromptTrait: Send + Sync {
    fn scenario(&self) -> LLMScenario;
    fn system_prompt(&self) -> String;
    fn user_prompt(&self) -> String;

    fn max_tokens(&self) -> Option<u32> {
        None
    }

    fn temperature(&self) -> Option<f32> {
        None
    }
}

#[async_trait]
pub trait LLMService: Send + Sync {
    /// Whether a provider is configured
    fn is_available(&self) -> bool;

    async fn complete(&self, prompt: &dyn LLMPromptTrait) -> Result<LLMCompletion, LLMError>;
}

pub struct LLMServiceImpl {
    client: Option<LLMClient>,
    max_tokens: u32,
    temperature: f32,
}

impl LLMServiceImpl {
    pub fn new(config: &LlmConfig) -> Result<Self, LLMError> {
        let client = if config.is_configured() {
            Some(LLMClient::new(config)?)
        } else {
            tracing::warn!("LLM api_key not set, AI endpoints will return 503");
            None
        };

        Ok(Self { client, max_tokens: config.max_tokens, temperature: config.temperature })
    }
}

#[async_trait]
impl LLMService for LLMServiceImpl {
    fn is_available(&self) -> bool {
        self.client.is_some()
    }

    async fn complete(&self, prompt: &dyn LLMPromptTrait) -> Result<LLMCompletion, LLMError> {
        let client = self.client.as_ref().ok_or(LLMError::NotConfigured)?;

        let scenario = prompt.scenario();
        tracing::info!("Running LLM scenario {} on {}", scenario.as_str(), client.model());

        let messages = vec![
            ChatMessage::system(prompt.system_prompt()),
            ChatMessage::user(prompt.user_prompt()),
        ];
        let max_tokens = prompt.max_tokens().unwrap_or(self.max_tokens);
        let temperature = prompt.temperature().unwrap_or(self.temperature);

        client
            .chat(messages, max_tokens, temperature)
            .await
            .inspect_err(|e| tracing::warn!("LLM scenario {} failed: {}", scenario.as_str(), e))
    }
}
