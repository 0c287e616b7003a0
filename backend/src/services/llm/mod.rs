//! LLM Service Module
//!
//! Text generation for book summaries and review digests.
//!
//! # Architecture
//! ```text
//! ┌─────────────────┐
//! │   LLMService    │  ← Trait (generic interface)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌──────────────────────┐
//! │ LLMClient            │
//! │ (OpenAI-compatible)  │
//! └──────────────────────┘
//! ```
//!
//! # Scenarios
//! - Book summary from raw book content
//! - Digest of reader reviews

mod client;
mod models;
mod scenarios;
mod service;

pub use models::*;
pub use scenarios::book_summary::BookSummaryPrompt;
pub use scenarios::review_digest::{DigestReview, ReviewDigestPrompt};
pub use service::{LLMPromptTrait, LLMService, LLMServiceImpl};
