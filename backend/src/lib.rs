//! Bookwise: a books and reviews API with AI summaries and cached recommendations.

rust_i18n::i18n!("locales", fallback = "en");

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use std::any::Any;
use std::sync::Arc;

use axum::{
    Json, Router,
    http::{HeaderValue, Method, StatusCode, header},
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use sqlx::SqlitePool;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{self, CorsLayer},
    trace::TraceLayer,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::{Config, CorsConfig};
use crate::handlers::{ai, auth, book, health, review};
use crate::middleware::{AuthState, auth_middleware, locale_middleware};
use crate::services::llm::LLMService;
use crate::services::{
    AiService, AuthService, BookService, CacheService, RecommendationService, ReviewService,
};
use crate::utils::JwtUtil;
use crate::utils::error::ApiErrorResponse;

pub const DOCS_PATH: &str = "/docs";
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

/// Shared state handed to every handler
pub struct AppState {
    pub config: Arc<Config>,
    pub jwt_util: Arc<JwtUtil>,
    pub auth_service: Arc<AuthService>,
    pub book_service: BookService,
    pub review_service: ReviewService,
    pub recommendation_service: RecommendationService,
    pub ai_service: AiService,
    pub cache: CacheService,
}

impl AppState {
    pub fn new(
        config: Config,
        pool: SqlitePool,
        cache: CacheService,
        llm: Arc<dyn LLMService>,
    ) -> anyhow::Result<Self> {
        let jwt_util = Arc::new(JwtUtil::new(
            &config.auth.jwt_secret,
            config.auth.algorithm()?,
            config.auth.expires_in_secs()?,
        ));
        let auth_service =
            Arc::new(AuthService::new(pool.clone(), jwt_util.clone(), config.auth.bcrypt_cost));
        let recommendation_service = RecommendationService::new(pool.clone(), cache.clone());
        let book_service = BookService::new(pool.clone(), recommendation_service.clone());
        let review_service = ReviewService::new(pool, recommendation_service.clone());
        let ai_service = AiService::new(book_service.clone(), review_service.clone(), llm);

        Ok(Self {
            config: Arc::new(config),
            jwt_util,
            auth_service,
            book_service,
            review_service,
            recommendation_service,
            ai_service,
            cache,
        })
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::root,
        health::health_check,
        auth::register,
        auth::login,
        book::create_book,
        book::list_books,
        book::get_book,
        book::update_book,
        book::delete_book,
        book::get_book_summary,
        review::list_reviews,
        review::create_review,
        review::get_review,
        review::update_review,
        review::delete_review,
        ai::generate_summary,
        ai::review_digest,
        ai::get_recommendations,
    ),
    components(schemas(
        models::UserRole,
        models::RegisterRequest,
        models::LoginRequest,
        models::TokenResponse,
        models::UserResponse,
        models::Book,
        models::CreateBookRequest,
        models::UpdateBookRequest,
        models::BookSummaryResponse,
        models::Review,
        models::CreateReviewRequest,
        models::UpdateReviewRequest,
        models::GenerateSummaryRequest,
        models::GenerateSummaryResponse,
        models::ReviewDigestResponse,
        models::BookRecommendation,
        models::RecommendationResponse,
        health::HealthResponse,
        health::RootResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "System", description = "Service info and health"),
        (name = "Authentication", description = "Registration and login"),
        (name = "Books", description = "Book catalogue"),
        (name = "Reviews", description = "Reader reviews"),
        (name = "AI & Recommendations", description = "AI summaries and recommendations"),
    ),
    info(
        title = "Bookwise API",
        version = "1.0.0",
        description = "Intelligent book management with AI-powered summaries and recommendations"
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let auth_state = AuthState {
        jwt_util: state.jwt_util.clone(),
        auth_service: state.auth_service.clone(),
    };

    let public_routes = Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login));

    let protected_routes = Router::new()
        .route("/api/books", get(book::list_books).post(book::create_book))
        .route(
            "/api/books/:id",
            get(book::get_book)
                .put(book::update_book)
                .delete(book::delete_book),
        )
        .route("/api/books/:id/summary", get(book::get_book_summary))
        .route(
            "/api/books/:id/reviews",
            get(review::list_reviews).post(review::create_review),
        )
        .route("/api/books/:id/reviews/digest", post(ai::review_digest))
        .route(
            "/api/reviews/:id",
            get(review::get_review)
                .put(review::update_review)
                .delete(review::delete_review),
        )
        .route("/api/generate-summary", post(ai::generate_summary))
        .route("/api/recommendations", get(ai::get_recommendations))
        .layer(axum_middleware::from_fn_with_state(auth_state, auth_middleware));

    let health_routes = Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health_check));

    let debug = state.config.app.debug;
    let cors = cors_layer(&state.config.cors);

    Router::new()
        .merge(SwaggerUi::new(DOCS_PATH).url(OPENAPI_PATH, ApiDoc::openapi()))
        .merge(public_routes)
        .merge(protected_routes)
        .merge(health_routes)
        .with_state(state)
        .layer(axum_middleware::from_fn(locale_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(CatchPanicLayer::custom(move |err: Box<dyn Any + Send + 'static>| {
            panic_response(err, debug)
        }))
}

/// `*` allows any origin without credentials; an explicit list allows credentials
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS];

    if config.allows_any() {
        return CorsLayer::new()
            .allow_origin(cors::Any)
            .allow_methods(methods)
            .allow_headers(cors::Any);
    }

    let origins: Vec<HeaderValue> = config
        .origins()
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            },
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT_LANGUAGE])
        .allow_credentials(true)
}

fn panic_response(err: Box<dyn Any + Send + 'static>, debug: bool) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!("Handler panicked: {}", detail);

    let body = ApiErrorResponse {
        code: 5001,
        message: "Internal server error".to_string(),
        details: debug.then(|| serde_json::Value::String(detail)),
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

#[cfg(test)]
mod tests;
