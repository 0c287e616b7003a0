use std::sync::Arc;

use crate::models::{
    GenerateSummaryRequest, GenerateSummaryResponse, ReviewDigestResponse, word_count,
};
use crate::services::llm::{BookSummaryPrompt, DigestReview, LLMService, ReviewDigestPrompt};
use crate::services::{BookService, ReviewService};
use crate::utils::{ApiError, ApiResult};

/// Maximum number of reviews sent to the model for one digest
pub const DIGEST_REVIEW_LIMIT: i64 = 20;

#[derive(Clone)]
pub struct AiService {
    books: BookService,
    reviews: ReviewService,
    llm: Arc<dyn LLMService>,
}

impl AiService {
    pub fn new(books: BookService, reviews: ReviewService, llm: Arc<dyn LLMService>) -> Self {
        Self { books, reviews, llm }
    }

    pub fn is_available(&self) -> bool {
        self.llm.is_available()
    }

    /// Summarize book content and store the result on the book
    pub async fn generate_summary(
        &self,
        req: GenerateSummaryRequest,
    ) -> ApiResult<GenerateSummaryResponse> {
        let book = self.books.get_book(req.book_id).await?;

        let prompt = BookSummaryPrompt {
            title: book.title,
            author: book.author,
            content: req.content,
        };
        let completion = self.llm.complete(&prompt).await?;

        self.books.set_summary(book.id, &completion.content).await?;
        tracing::info!(
            "Stored summary for book {} ({} tokens, {}ms)",
            book.id,
            completion.usage.total_tokens,
            completion.latency_ms
        );

        Ok(GenerateSummaryResponse {
            word_count: word_count(&completion.content),
            summary: completion.content,
        })
    }

    /// Digest of the latest reviews of a book; not persisted
    pub async fn review_digest(&self, book_id: i64) -> ApiResult<ReviewDigestResponse> {
        let book = self.books.get_book(book_id).await?;
        let reviews = self.reviews.latest_reviews(book_id, DIGEST_REVIEW_LIMIT).await?;
        if reviews.is_empty() {
            return Err(ApiError::invalid_input(format!("Book {} has no reviews to digest", book_id)));
        }

        let prompt = ReviewDigestPrompt {
            title: book.title,
            author: book.author,
            reviews: reviews
                .into_iter()
                .map(|review| DigestReview { rating: review.rating, text: review.review_text })
                .collect(),
        };
        let review_count = prompt.reviews.len();
        let completion = self.llm.complete(&prompt).await?;

        Ok(ReviewDigestResponse {
            book_id,
            word_count: word_count(&completion.content),
            digest: completion.content,
            review_count,
        })
    }
}
