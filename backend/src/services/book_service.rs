use sqlx::{QueryBuilder, SqlitePool, sqlite::Sqlite};

use crate::models::{Book, BookFilter, BookSummaryResponse, CreateBookRequest, UpdateBookRequest};
use crate::services::RecommendationService;
use crate::utils::{ApiError, ApiResult, Pagination};

#[derive(Clone)]
pub struct BookService {
    pool: SqlitePool,
    recommendations: RecommendationService,
}

impl BookService {
    pub fn new(pool: SqlitePool, recommendations: RecommendationService) -> Self {
        Self { pool, recommendations }
    }

    pub async fn create_book(&self, req: CreateBookRequest) -> ApiResult<Book> {
        let result = sqlx::query(
            "INSERT INTO books (title, author, genre, year_published) VALUES (?, ?, ?, ?)",
        )
        .bind(&req.title)
        .bind(&req.author)
        .bind(&req.genre)
        .bind(req.year_published)
        .execute(&self.pool)
        .await?;

        let book = self.get_book(result.last_insert_rowid()).await?;
        self.recommendations.invalidate().await;
        Ok(book)
    }

    /// Newest first, optional substring filters (SQLite `LIKE`, ASCII case-insensitive)
    pub async fn list_books(&self, filter: &BookFilter, page: Pagination) -> ApiResult<Vec<Book>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM books WHERE 1 = 1");

        for (column, value) in [
            ("genre", &filter.genre),
            ("author", &filter.author),
            ("title", &filter.title),
        ] {
            if let Some(value) = value {
                qb.push(format!(" AND {} LIKE ", column))
                    .push_bind(like_pattern(value))
                    .push(" ESCAPE '\\'");
            }
        }

        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.skip);

        let books = qb.build_query_as::<Book>().fetch_all(&self.pool).await?;
        Ok(books)
    }

    pub async fn get_book(&self, book_id: i64) -> ApiResult<Book> {
        sqlx::query_as("SELECT * FROM books WHERE id = ?")
            .bind(book_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ApiError::book_not_found(book_id))
    }

    pub async fn update_book(&self, book_id: i64, req: UpdateBookRequest) -> ApiResult<Book> {
        let mut tx = self.pool.begin().await?;

        let result = {
            let conn = tx.as_mut();
            sqlx::query(
                r#"
                UPDATE books SET
                    title = COALESCE(?, title),
                    author = COALESCE(?, author),
                    genre = COALESCE(?, genre),
                    year_published = COALESCE(?, year_published),
                    summary = COALESCE(?, summary),
                    updated_at = CURRENT_TIMESTAMP
                WHERE id = ?
                "#,
            )
            .bind(&req.title)
            .bind(&req.author)
            .bind(&req.genre)
            .bind(req.year_published)
            .bind(&req.summary)
            .bind(book_id)
            .execute(conn)
            .await?
        };

        if result.rows_affected() == 0 {
            return Err(ApiError::book_not_found(book_id));
        }

        let book: Book = {
            let conn = tx.as_mut();
            sqlx::query_as("SELECT * FROM books WHERE id = ?")
                .bind(book_id)
                .fetch_one(conn)
                .await?
        };

        tx.commit().await?;

        self.recommendations.invalidate().await;
        Ok(book)
    }

    /// Delete a book; its reviews go with it
    pub async fn delete_book(&self, book_id: i64) -> ApiResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(book_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::book_not_found(book_id));
        }

        self.recommendations.invalidate().await;
        Ok(())
    }

    pub async fn set_summary(&self, book_id: i64, summary: &str) -> ApiResult<Book> {
        let result = sqlx::query(
            "UPDATE books SET summary = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
        )
        .bind(summary)
        .bind(book_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::book_not_found(book_id));
        }

        self.get_book(book_id).await
    }

    /// Book info with average rating (0.0 when unreviewed) and review count
    pub async fn get_book_summary(&self, book_id: i64) -> ApiResult<BookSummaryResponse> {
        sqlx::query_as(
            r#"
            SELECT b.id, b.title, b.author, b.summary,
                   COALESCE(AVG(r.rating), 0.0) AS average_rating,
                   COUNT(r.id) AS total_reviews
            FROM books b
            LEFT JOIN reviews r ON r.book_id = b.id
            WHERE b.id = ?
            GROUP BY b.id
            "#,
        )
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ApiError::book_not_found(book_id))
    }
}

/// `%value%` with LIKE wildcards escaped. Case is left to `LIKE`, which folds
/// ASCII only, so the pattern must not be case-mapped here.
pub(crate) fn like_pattern(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("Sci-Fi"), "%Sci-Fi%");
        assert_eq!(like_pattern("Émile"), "%Émile%");
        assert_eq!(like_pattern("100%_real"), "%100\\%\\_real%");
    }
}
