use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};

use crate::AppState;
use crate::models::{CreateReviewRequest, CurrentUser, Review, UpdateReviewRequest};
use crate::utils::{ApiPath, ApiQuery, ApiResult, PaginationParams, ValidatedJson};

/// List reviews of a book, newest first
#[utoipa::path(
    get,
    path = "/api/books/{id}/reviews",
    params(("id" = i64, Path, description = "Book ID"), PaginationParams),
    responses(
        (status = 200, description = "Reviews of the book", body = Vec<Review>),
        (status = 404, description = "Book not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn list_reviews(
    State(state): State<Arc<AppState>>,
    ApiPath(book_id): ApiPath<i64>,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> ApiResult<Json<Vec<Review>>> {
    let page = params.resolve(&state.config.pagination)?;
    let reviews = state.review_service.list_reviews(book_id, page).await?;
    tracing::debug!("Retrieved {} reviews for book {}", reviews.len(), book_id);
    Ok(Json(reviews))
}

/// Review a book (once per user)
#[utoipa::path(
    post,
    path = "/api/books/{id}/reviews",
    params(("id" = i64, Path, description = "Book ID")),
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review created", body = Review),
        (status = 400, description = "Book already reviewed by this user"),
        (status = 404, description = "Book not found"),
        (status = 422, description = "Validation error"),
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn create_review(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    ApiPath(book_id): ApiPath<i64>,
    ValidatedJson(payload): ValidatedJson<CreateReviewRequest>,
) -> ApiResult<(StatusCode, Json<Review>)> {
    let review = state
        .review_service
        .create_review(book_id, user.id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// Get a review
#[utoipa::path(
    get,
    path = "/api/reviews/{id}",
    params(("id" = i64, Path, description = "Review ID")),
    responses(
        (status = 200, description = "Review detail", body = Review),
        (status = 404, description = "Review not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn get_review(
    State(state): State<Arc<AppState>>,
    ApiPath(review_id): ApiPath<i64>,
) -> ApiResult<Json<Review>> {
    let review = state.review_service.get_review(review_id).await?;
    Ok(Json(review))
}

/// Update your own review
#[utoipa::path(
    put,
    path = "/api/reviews/{id}",
    params(("id" = i64, Path, description = "Review ID")),
    request_body = UpdateReviewRequest,
    responses(
        (status = 200, description = "Review updated", body = Review),
        (status = 403, description = "Not the review author"),
        (status = 404, description = "Review not found"),
        (status = 422, description = "Validation error"),
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn update_review(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    ApiPath(review_id): ApiPath<i64>,
    ValidatedJson(payload): ValidatedJson<UpdateReviewRequest>,
) -> ApiResult<Json<Review>> {
    tracing::info!("User {} updating review {}", user.username, review_id);
    let review = state
        .review_service
        .update_review(review_id, user.id, payload)
        .await?;
    Ok(Json(review))
}

/// Delete your own review
#[utoipa::path(
    delete,
    path = "/api/reviews/{id}",
    params(("id" = i64, Path, description = "Review ID")),
    responses(
        (status = 204, description = "Review deleted"),
        (status = 403, description = "Not the review author"),
        (status = 404, description = "Review not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn delete_review(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    ApiPath(review_id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    tracing::info!("User {} deleting review {}", user.username, review_id);
    state.review_service.delete_review(review_id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
