use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GenerateSummaryRequest {
    #[validate(range(min = 1, message = "must be a positive id"))]
    pub book_id: i64,
    #[validate(length(min = 50, max = 50000, message = "must be 50-50000 characters"))]
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GenerateSummaryResponse {
    pub summary: String,
    pub word_count: usize,
}

/// AI digest of what readers say about a book
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReviewDigestResponse {
    pub book_id: i64,
    pub digest: String,
    /// Number of reviews sent to the model
    pub review_count: usize,
    pub word_count: usize,
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
