use sqlx::SqlitePool;

use crate::models::{CreateReviewRequest, Review, UpdateReviewRequest};
use crate::services::RecommendationService;
use crate::services::auth_service::map_unique_violation;
use crate::utils::{ApiError, ApiResult, Pagination};

const DUPLICATE_REVIEW: &str = "You have already reviewed this book";

#[derive(Clone)]
pub struct ReviewService {
    pool: SqlitePool,
    recommendations: RecommendationService,
}

impl ReviewService {
    pub fn new(pool: SqlitePool, recommendations: RecommendationService) -> Self {
        Self { pool, recommendations }
    }

    pub async fn list_reviews(&self, book_id: i64, page: Pagination) -> ApiResult<Vec<Review>> {
        self.ensure_book_exists(book_id).await?;

        let reviews = sqlx::query_as(
            "SELECT * FROM reviews WHERE book_id = ? ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        )
        .bind(book_id)
        .bind(page.limit)
        .bind(page.skip)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    /// Most recent reviews of a book, newest first
    pub async fn latest_reviews(&self, book_id: i64, limit: i64) -> ApiResult<Vec<Review>> {
        self.list_reviews(book_id, Pagination { skip: 0, limit }).await
    }

    pub async fn create_review(
        &self,
        book_id: i64,
        user_id: i64,
        req: CreateReviewRequest,
    ) -> ApiResult<Review> {
        let mut tx = self.pool.begin().await?;

        let book: Option<(i64,)> = {
            let conn = tx.as_mut();
            sqlx::query_as("SELECT id FROM books WHERE id = ?")
                .bind(book_id)
                .fetch_optional(conn)
                .await?
        };
        if book.is_none() {
            return Err(ApiError::book_not_found(book_id));
        }

        let existing: Option<(i64,)> = {
            let conn = tx.as_mut();
            sqlx::query_as("SELECT id FROM reviews WHERE book_id = ? AND user_id = ?")
                .bind(book_id)
                .bind(user_id)
                .fetch_optional(conn)
                .await?
        };
        if existing.is_some() {
            return Err(ApiError::already_exists(DUPLICATE_REVIEW));
        }

        let result = {
            let conn = tx.as_mut();
            sqlx::query(
                "INSERT INTO reviews (book_id, user_id, review_text, rating) VALUES (?, ?, ?, ?)",
            )
            .bind(book_id)
            .bind(user_id)
            .bind(&req.review_text)
            .bind(req.rating)
            .execute(conn)
            .await
            .map_err(|err| map_unique_violation(err, DUPLICATE_REVIEW))?
        };

        tx.commit().await?;

        let review = self.get_review(result.last_insert_rowid()).await?;
        tracing::info!("User {} reviewed book {} ({}/5)", user_id, book_id, review.rating);

        self.recommendations.invalidate().await;
        Ok(review)
    }

    pub async fn get_review(&self, review_id: i64) -> ApiResult<Review> {
        sqlx::query_as("SELECT * FROM reviews WHERE id = ?")
            .bind(review_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ApiError::review_not_found(review_id))
    }

    /// Only the author may change a review
    pub async fn update_review(
        &self,
        review_id: i64,
        user_id: i64,
        req: UpdateReviewRequest,
    ) -> ApiResult<Review> {
        let review = self.get_review(review_id).await?;
        if review.user_id != user_id {
            return Err(ApiError::forbidden("You can only update your own reviews"));
        }

        sqlx::query(
            r#"
            UPDATE reviews SET
                review_text = COALESCE(?, review_text),
                rating = COALESCE(?, rating),
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            "#,
        )
        .bind(&req.review_text)
        .bind(req.rating)
        .bind(review_id)
        .execute(&self.pool)
        .await?;

        let review = self.get_review(review_id).await?;
        self.recommendations.invalidate().await;
        Ok(review)
    }

    /// Only the author may delete a review
    pub async fn delete_review(&self, review_id: i64, user_id: i64) -> ApiResult<()> {
        let review = self.get_review(review_id).await?;
        if review.user_id != user_id {
            return Err(ApiError::forbidden("You can only delete your own reviews"));
        }

        sqlx::query("DELETE FROM reviews WHERE id = ?")
            .bind(review_id)
            .execute(&self.pool)
            .await?;

        self.recommendations.invalidate().await;
        Ok(())
    }

    async fn ensure_book_exists(&self, book_id: i64) -> ApiResult<()> {
        let book: Option<(i64,)> = sqlx::query_as("SELECT id FROM books WHERE id = ?")
            .bind(book_id)
            .fetch_optional(&self.pool)
            .await?;

        book.map(|_| ()).ok_or_else(|| ApiError::book_not_found(book_id))
    }
}
