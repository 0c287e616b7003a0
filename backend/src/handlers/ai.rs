//! AI & recommendation handlers

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
};

use crate::AppState;
use crate::models::{
    GenerateSummaryRequest, GenerateSummaryResponse, RecommendationQuery, RecommendationResponse,
    ReviewDigestResponse,
};
use crate::utils::{ApiPath, ApiQuery, ApiResult, ValidatedJson};

/// Generate and store an AI summary for a book
#[utoipa::path(
    post,
    path = "/api/generate-summary",
    request_body = GenerateSummaryRequest,
    responses(
        (status = 200, description = "Summary generated", body = GenerateSummaryResponse),
        (status = 404, description = "Book not found"),
        (status = 422, description = "Validation error"),
        (status = 429, description = "AI provider rate limit"),
        (status = 502, description = "AI provider failure"),
        (status = 503, description = "AI service not configured"),
        (status = 504, description = "AI provider timeout"),
    ),
    security(("bearer_auth" = [])),
    tag = "AI & Recommendations"
)]
pub async fn generate_summary(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<GenerateSummaryRequest>,
) -> ApiResult<Json<GenerateSummaryResponse>> {
    tracing::info!(
        "Generating summary for book {} from {} chars",
        payload.book_id,
        payload.content.chars().count()
    );
    let response = state.ai_service.generate_summary(payload).await?;
    Ok(Json(response))
}

/// AI digest of the latest reviews of a book
#[utoipa::path(
    post,
    path = "/api/books/{id}/reviews/digest",
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Review digest", body = ReviewDigestResponse),
        (status = 400, description = "Book has no reviews"),
        (status = 404, description = "Book not found"),
        (status = 502, description = "AI provider failure"),
        (status = 503, description = "AI service not configured"),
    ),
    security(("bearer_auth" = [])),
    tag = "AI & Recommendations"
)]
pub async fn review_digest(
    State(state): State<Arc<AppState>>,
    ApiPath(book_id): ApiPath<i64>,
) -> ApiResult<Json<ReviewDigestResponse>> {
    tracing::info!("Generating review digest for book {}", book_id);
    let response = state.ai_service.review_digest(book_id).await?;
    Ok(Json(response))
}

/// Book recommendations ranked by review count and rating
#[utoipa::path(
    get,
    path = "/api/recommendations",
    params(RecommendationQuery),
    responses(
        (status = 200, description = "Recommendations", body = RecommendationResponse),
        (status = 422, description = "Invalid filter"),
    ),
    security(("bearer_auth" = [])),
    tag = "AI & Recommendations"
)]
pub async fn get_recommendations(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<RecommendationQuery>,
) -> ApiResult<Json<RecommendationResponse>> {
    let filter = query.resolve()?;
    let response = state
        .recommendation_service
        .get_recommendations(&filter)
        .await?;
    tracing::debug!(
        "Returning {} recommendations (cached={})",
        response.total,
        response.cached
    );
    Ok(Json(response))
}
