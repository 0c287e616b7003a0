//! Book Summary Scenario - condense raw book content into a short blurb

use super::language::build_language_prompt_section;
use crate::services::llm::{LLMPromptTrait, LLMScenario};

const SYSTEM_PROMPT: &str = "You are a professional book reviewer and summarizer. \
Create engaging, accurate, and concise summaries.";

/// Target summary length in words
pub const SUMMARY_TARGET_WORDS: usize = 100;

#[derive(Debug, Clone)]
pub struct BookSummaryPrompt {
    pub title: String,
    pub author: String,
    pub content: String,
}

impl LLMPromptTrait for BookSummaryPrompt {
    fn scenario(&self) -> LLMScenario {
        LLMScenario::BookSummary
    }

    fn system_prompt(&self) -> String {
        format!("{}{}", SYSTEM_PROMPT, build_language_prompt_section())
    }

    fn user_prompt(&self) -> String {
        format!(
            "Provide a concise and engaging summary of the following content from \
\"{}\" by {} in approximately {} words. Focus on the main themes, plot, and key points:\n\n\
{}\n\nSummary:",
            self.title, self.author, SUMMARY_TARGET_WORDS, self.content
        )
    }
}
