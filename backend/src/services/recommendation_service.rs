use sqlx::{QueryBuilder, SqlitePool, sqlite::Sqlite};

use crate::models::{BookRecommendation, RecommendationFilter, RecommendationResponse};
use crate::services::CacheService;
use crate::services::book_service::like_pattern;
use crate::utils::ApiResult;

pub const RECOMMENDATION_CACHE_PATTERN: &str = "recommendations:*";

#[derive(Clone)]
pub struct RecommendationService {
    pool: SqlitePool,
    cache: CacheService,
}

impl RecommendationService {
    pub fn new(pool: SqlitePool, cache: CacheService) -> Self {
        Self { pool, cache }
    }

    /// Most-reviewed, best-rated books first. Results are cached per filter.
    pub async fn get_recommendations(
        &self,
        filter: &RecommendationFilter,
    ) -> ApiResult<RecommendationResponse> {
        let cache_key = filter.cache_key();

        let cached: Option<Vec<BookRecommendation>> = self.cache.get_json(&cache_key).await;
        if let Some(recommendations) = cached {
            tracing::debug!("Recommendation cache hit: {}", cache_key);
            return Ok(RecommendationResponse {
                total: recommendations.len(),
                recommendations,
                cached: true,
            });
        }

        let recommendations = self.query_recommendations(filter).await?;
        self.cache.set_json(&cache_key, &recommendations).await;
        tracing::debug!(
            "Recommendation cache miss: {} ({} results)",
            cache_key,
            recommendations.len()
        );

        Ok(RecommendationResponse {
            total: recommendations.len(),
            recommendations,
            cached: false,
        })
    }

    /// Drop every cached recommendation list
    pub async fn invalidate(&self) {
        let deleted = self.cache.clear_pattern(RECOMMENDATION_CACHE_PATTERN).await;
        if deleted > 0 {
            tracing::debug!("Invalidated {} recommendation cache entries", deleted);
        }
    }

    async fn query_recommendations(
        &self,
        filter: &RecommendationFilter,
    ) -> ApiResult<Vec<BookRecommendation>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            r#"
            SELECT b.id, b.title, b.author, b.genre,
                   AVG(r.rating) AS average_rating,
                   COUNT(r.id) AS total_reviews
            FROM books b
            LEFT JOIN reviews r ON r.book_id = b.id
            "#,
        );

        if let Some(genre) = &filter.genre {
            qb.push(" WHERE b.genre LIKE ")
                .push_bind(like_pattern(genre))
                .push(" ESCAPE '\\'");
        }

        qb.push(" GROUP BY b.id, b.title, b.author, b.genre");

        if let Some(min_rating) = filter.min_rating {
            qb.push(" HAVING AVG(r.rating) >= ").push_bind(min_rating);
        }

        qb.push(" ORDER BY total_reviews DESC, average_rating DESC, b.id ASC LIMIT ")
            .push_bind(filter.limit);

        let rows = qb
            .build_query_as::<BookRecommendation>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
