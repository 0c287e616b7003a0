//! LLM Scenarios
//!
//! Each scenario implements LLMPromptTrait.

pub mod book_summary;
pub mod language;
pub mod review_digest;
