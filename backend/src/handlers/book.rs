use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};

use crate::AppState;
use crate::models::{Book, BookListQuery, BookSummaryResponse, CreateBookRequest, UpdateBookRequest};
use crate::utils::{ApiPath, ApiQuery, ApiResult, ValidatedJson};

/// Create a book
#[utoipa::path(
    post,
    path = "/api/books",
    request_body = CreateBookRequest,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 422, description = "Validation error"),
    ),
    security(("bearer_auth" = [])),
    tag = "Books"
)]
pub async fn create_book(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<CreateBookRequest>,
) -> ApiResult<(StatusCode, Json<Book>)> {
    tracing::info!("Creating book: {} by {}", payload.title, payload.author);
    let book = state.book_service.create_book(payload).await?;
    tracing::info!("Created book: {} (ID: {})", book.title, book.id);
    Ok((StatusCode::CREATED, Json(book)))
}

/// List books, newest first
#[utoipa::path(
    get,
    path = "/api/books",
    params(BookListQuery),
    responses(
        (status = 200, description = "List of books", body = Vec<Book>),
        (status = 422, description = "Invalid pagination"),
    ),
    security(("bearer_auth" = [])),
    tag = "Books"
)]
pub async fn list_books(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<BookListQuery>,
) -> ApiResult<Json<Vec<Book>>> {
    let page = query.pagination().resolve(&state.config.pagination)?;
    let books = state.book_service.list_books(&query.filter(), page).await?;
    tracing::debug!("Retrieved {} books (skip={}, limit={})", books.len(), page.skip, page.limit);
    Ok(Json(books))
}

/// Get a book
#[utoipa::path(
    get,
    path = "/api/books/{id}",
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book detail", body = Book),
        (status = 404, description = "Book not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Books"
)]
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    ApiPath(book_id): ApiPath<i64>,
) -> ApiResult<Json<Book>> {
    tracing::debug!("Fetching book_id={}", book_id);
    let book = state.book_service.get_book(book_id).await?;
    Ok(Json(book))
}

/// Partially update a book
#[utoipa::path(
    put,
    path = "/api/books/{id}",
    params(("id" = i64, Path, description = "Book ID")),
    request_body = UpdateBookRequest,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 404, description = "Book not found"),
        (status = 422, description = "Validation error"),
    ),
    security(("bearer_auth" = [])),
    tag = "Books"
)]
pub async fn update_book(
    State(state): State<Arc<AppState>>,
    ApiPath(book_id): ApiPath<i64>,
    ValidatedJson(payload): ValidatedJson<UpdateBookRequest>,
) -> ApiResult<Json<Book>> {
    tracing::info!("Updating book_id={}", book_id);
    let book = state.book_service.update_book(book_id, payload).await?;
    Ok(Json(book))
}

/// Delete a book and its reviews
#[utoipa::path(
    delete,
    path = "/api/books/{id}",
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Books"
)]
pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    ApiPath(book_id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    tracing::info!("Deleting book_id={}", book_id);
    state.book_service.delete_book(book_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Book summary with aggregated rating
#[utoipa::path(
    get,
    path = "/api/books/{id}/summary",
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book summary and rating statistics", body = BookSummaryResponse),
        (status = 404, description = "Book not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Books"
)]
pub async fn get_book_summary(
    State(state): State<Arc<AppState>>,
    ApiPath(book_id): ApiPath<i64>,
) -> ApiResult<Json<BookSummaryResponse>> {
    let summary = state.book_service.get_book_summary(book_id).await?;
    Ok(Json(summary))
}
