//! Review Digest Scenario - what readers say about a book

use std::fmt::Write;

use super::language::build_language_prompt_section;
use crate::services::llm::{LLMPromptTrait, LLMScenario};

const SYSTEM_PROMPT: &str = "You are a literary critic who distills reader feedback. \
Summarize the overall sentiment, recurring praise and recurring criticism in one short paragraph. \
Do not invent opinions that are not present in the reviews.";

/// One review as fed to the model
#[derive(Debug, Clone)]
pub struct DigestReview {
    pub rating: i32,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct ReviewDigestPrompt {
    pub title: String,
    pub author: String,
    pub reviews: Vec<DigestReview>,
}

impl LLMPromptTrait for ReviewDigestPrompt {
    fn scenario(&self) -> LLMScenario {
        LLMScenario::ReviewDigest
    }

    fn system_prompt(&self) -> String {
        format!("{}{}", SYSTEM_PROMPT, build_language_prompt_section())
    }

    fn user_prompt(&self) -> String {
        let mut prompt = format!(
            "Here are {} reader reviews of \"{}\" by {}:\n\n",
            self.reviews.len(),
            self.title,
            self.author
        );
        for (idx, review) in self.reviews.iter().enumerate() {
            let _ = writeln!(prompt, "{}. [{}/5] {}", idx + 1, review.rating, review.text.trim());
        }
        prompt.push_str("\nDigest:");
        prompt
    }

    fn max_tokens(&self) -> Option<u32> {
        Some(300)
    }

    fn temperature(&self) -> Option<f32> {
        Some(0.3)
    }
}
