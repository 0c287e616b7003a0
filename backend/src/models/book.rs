use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::utils::PaginationParams;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub year_published: i32,
    /// AI-generated summary
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBookRequest {
    #[validate(length(min = 1, max = 500, message = "must be 1-500 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 255, message = "must be 1-255 characters"))]
    pub author: String,
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub genre: String,
    #[validate(range(min = 1000, max = 2100, message = "must be between 1000 and 2100"))]
    pub year_published: i32,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBookRequest {
    #[validate(length(min = 1, max = 500, message = "must be 1-500 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 255, message = "must be 1-255 characters"))]
    pub author: Option<String>,
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub genre: Option<String>,
    #[validate(range(min = 1000, max = 2100, message = "must be between 1000 and 2100"))]
    pub year_published: Option<i32>,
    pub summary: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct BookListQuery {
    /// Number of records to skip
    pub skip: Option<i64>,
    /// Maximum number of records to return
    pub limit: Option<i64>,
    /// Case-insensitive substring match on genre
    pub genre: Option<String>,
    /// Case-insensitive substring match on author
    pub author: Option<String>,
    /// Case-insensitive substring match on title
    pub title: Option<String>,
}

impl BookListQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams { skip: self.skip, limit: self.limit }
    }

    pub fn filter(&self) -> BookFilter {
        BookFilter {
            genre: non_blank(&self.genre),
            author: non_blank(&self.author),
            title: non_blank(&self.title),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct BookFilter {
    pub genre: Option<String>,
    pub author: Option<String>,
    pub title: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

/// Book info with aggregated review statistics
#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookSummaryResponse {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub summary: Option<String>,
    /// 0.0 when the book has no reviews
    pub average_rating: f64,
    pub total_reviews: i64,
}
