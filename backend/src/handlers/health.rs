use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Serialize;
use utoipa::ToSchema;

use crate::AppState;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub app_name: String,
    pub version: String,
    /// Active cache backend: "redis", "memory" or "none"
    pub cache_backend: String,
    /// Whether an LLM provider is configured
    pub ai_available: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RootResponse {
    pub app_name: String,
    pub version: String,
    pub docs_url: String,
    pub openapi_url: String,
}

/// Liveness probe
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is healthy", body = HealthResponse)),
    tag = "System"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        app_name: state.config.app.name.clone(),
        version: VERSION.to_string(),
        cache_backend: state.cache.backend_name().to_string(),
        ai_available: state.ai_service.is_available(),
    })
}

/// Service banner with documentation links
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service info", body = RootResponse)),
    tag = "System"
)]
pub async fn root(State(state): State<Arc<AppState>>) -> Json<RootResponse> {
    Json(RootResponse {
        app_name: state.config.app.name.clone(),
        version: VERSION.to_string(),
        docs_url: crate::DOCS_PATH.to_string(),
        openapi_url: crate::OPENAPI_PATH.to_string(),
    })
}
