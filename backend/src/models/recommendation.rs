use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use crate::utils::{ApiError, ApiResult};

pub const DEFAULT_RECOMMENDATION_LIMIT: i64 = 10;
pub const MAX_RECOMMENDATION_LIMIT: i64 = 50;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct RecommendationQuery {
    /// Filter by genre (case-insensitive substring)
    pub genre: Option<String>,
    /// Minimum average rating (1-5)
    pub min_rating: Option<f64>,
    /// Number of recommendations (1-50)
    pub limit: Option<i64>,
}

/// Validated, normalized recommendation filter
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationFilter {
    pub genre: Option<String>,
    pub min_rating: Option<f64>,
    pub limit: i64,
}

impl RecommendationQuery {
    pub fn resolve(&self) -> ApiResult<RecommendationFilter> {
        let limit = self.limit.unwrap_or(DEFAULT_RECOMMENDATION_LIMIT);
        if !(1..=MAX_RECOMMENDATION_LIMIT).contains(&limit) {
            return Err(ApiError::validation_error(format!(
                "limit: must be between 1 and {}",
                MAX_RECOMMENDATION_LIMIT
            )));
        }

        if let Some(min_rating) = self.min_rating
            && !(1.0..=5.0).contains(&min_rating)
        {
            return Err(ApiError::validation_error("min_rating: must be between 1 and 5"));
        }

        let genre = self
            .genre
            .as_deref()
            .map(|g| g.trim().to_ascii_lowercase())
            .filter(|g| !g.is_empty());

        Ok(RecommendationFilter { genre, min_rating: self.min_rating, limit })
    }
}

impl RecommendationFilter {
    pub fn cache_key(&self) -> String {
        let min_rating = self
            .min_rating
            .map(|r| r.to_string())
            .unwrap_or_else(|| "any".to_string());
        format!(
            "recommendations:genre={}:min_rating={}:limit={}",
            self.genre.as_deref().unwrap_or("any"),
            min_rating,
            self.limit
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookRecommendation {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub average_rating: Option<f64>,
    pub total_reviews: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecommendationResponse {
    pub recommendations: Vec<BookRecommendation>,
    pub total: usize,
    /// True when served from the cache
    pub cached: bool,
}
