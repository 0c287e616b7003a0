use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_i18n::t;
use serde::Serialize;
use thiserror::Error;

use super::i18n::get_locale;
use crate::services::llm::LLMError;

/// API Error with rich context and automatic error trait implementations
///
/// Each variant carries a stable numeric code (see [`ApiError::error_code`])
/// and maps to exactly one HTTP status.
#[derive(Error, Debug)]
pub enum ApiError {
    // Authentication errors 1xxx
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Inactive user")]
    InactiveUser,

    // Resource errors 3xxx
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Book {book_id} not found")]
    BookNotFound { book_id: i64 },

    #[error("Review {review_id} not found")]
    ReviewNotFound { review_id: i64 },

    // Validation errors 4xxx
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    // System errors 5xxx
    #[error("Internal error: {0}")]
    InternalError(String),

    // AI provider errors 6xxx
    #[error("AI service is not configured")]
    AiUnavailable,

    #[error("AI provider request failed: {0}")]
    AiProviderFailed(String),

    #[error("AI provider rate limit exceeded: {0}")]
    AiRateLimited(String),

    #[error("AI provider timed out")]
    AiTimeout,

    // Database errors - auto-convert from sqlx::Error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    // Generic wrapper for other errors - auto-convert from anyhow::Error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// Helper to create unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    /// Helper to create forbidden error
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    /// Helper to create invalid credentials error
    pub fn invalid_credentials() -> Self {
        Self::InvalidCredentials
    }

    pub fn book_not_found(book_id: i64) -> Self {
        Self::BookNotFound { book_id }
    }

    pub fn review_not_found(review_id: i64) -> Self {
        Self::ReviewNotFound { review_id }
    }

    /// Helper to create not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::ResourceNotFound(message.into())
    }

    /// Helper to create internal error
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }

    /// Helper to create invalid input error (400)
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Helper to create validation error (422)
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// Helper to create duplicate-resource error
    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::AlreadyExists(message.into())
    }

    /// Stable numeric error code returned in the response body
    pub fn error_code(&self) -> i32 {
        match self {
            // Authentication errors 1xxx
            Self::Unauthorized(_) => 1001,
            Self::TokenExpired => 1002,
            Self::InvalidCredentials => 1003,
            Self::Forbidden(_) => 1004,
            Self::InactiveUser => 1005,

            // Resource errors 3xxx
            Self::ResourceNotFound(_) => 3000,
            Self::BookNotFound { .. } => 3001,
            Self::ReviewNotFound { .. } => 3002,

            // Validation errors 4xxx
            Self::ValidationError(_) => 4001,
            Self::InvalidInput(_) => 4002,
            Self::AlreadyExists(_) => 4003,

            // System errors 5xxx
            Self::InternalError(_) => 5001,
            Self::Database(_) => 5002,
            Self::Other(_) => 5001,

            // AI provider errors 6xxx
            Self::AiUnavailable => 6001,
            Self::AiProviderFailed(_) => 6002,
            Self::AiRateLimited(_) => 6003,
            Self::AiTimeout => 6004,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) | Self::TokenExpired | Self::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            },
            Self::Forbidden(_) | Self::InactiveUser => StatusCode::FORBIDDEN,
            Self::ResourceNotFound(_) | Self::BookNotFound { .. } | Self::ReviewNotFound { .. } => {
                StatusCode::NOT_FOUND
            },
            Self::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidInput(_) | Self::AlreadyExists(_) => StatusCode::BAD_REQUEST,
            Self::AiUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::AiProviderFailed(_) => StatusCode::BAD_GATEWAY,
            Self::AiRateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::AiTimeout => StatusCode::GATEWAY_TIMEOUT,
            Self::InternalError(_) | Self::Database(_) | Self::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        }
    }
}

/// Error body returned by every failing endpoint
#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Get localized error message based on current locale
    pub fn localized_message(&self) -> String {
        let locale = get_locale();
        match self {
            Self::Unauthorized(msg) => {
                if msg.contains("Missing authorization header") {
                    t!("auth.missing_header", locale = &locale).to_string()
                } else if msg.contains("Invalid authorization header") {
                    t!("auth.invalid_header", locale = &locale).to_string()
                } else if msg.contains("JWT verification failed") {
                    t!("auth.jwt_failed", locale = &locale).to_string()
                } else {
                    msg.clone()
                }
            },
            Self::TokenExpired => t!("auth.token_expired", locale = &locale).to_string(),
            Self::InvalidCredentials => t!("auth.invalid_credentials", locale = &locale).to_string(),
            Self::Forbidden(msg) => msg.clone(),
            Self::InactiveUser => t!("auth.inactive_user", locale = &locale).to_string(),
            Self::ResourceNotFound(name) => {
                t!("resource.not_found", locale = &locale, name = name).to_string()
            },
            Self::BookNotFound { book_id } => {
                t!("book.not_found", locale = &locale, id = book_id).to_string()
            },
            Self::ReviewNotFound { review_id } => {
                t!("review.not_found", locale = &locale, id = review_id).to_string()
            },
            Self::ValidationError(details) => {
                t!("validation.failed", locale = &locale, details = details).to_string()
            },
            Self::InvalidInput(msg) | Self::AlreadyExists(msg) => msg.clone(),
            Self::InternalError(msg) => {
                t!("internal.error", locale = &locale, message = msg).to_string()
            },
            Self::AiUnavailable => t!("ai.unavailable", locale = &locale).to_string(),
            Self::AiProviderFailed(reason) => {
                t!("ai.provider_failed", locale = &locale, reason = reason).to_string()
            },
            Self::AiRateLimited(_) => t!("ai.rate_limited", locale = &locale).to_string(),
            Self::AiTimeout => t!("ai.timeout", locale = &locale).to_string(),
            Self::Database(err) => {
                t!("database.error", locale = &locale, error = err.to_string()).to_string()
            },
            Self::Other(err) => {
                t!("internal.error", locale = &locale, message = err.to_string()).to_string()
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed with {}: {}", status, self);
        }

        let response = ApiErrorResponse {
            code: self.error_code(),
            message: self.localized_message(),
            details: None,
        };

        (status, Json(response)).into_response()
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::internal_error(format!("JSON serialization error: {}", err))
    }
}

impl From<LLMError> for ApiError {
    fn from(err: LLMError) -> Self {
        match err {
            LLMError::NotConfigured => ApiError::AiUnavailable,
            LLMError::RateLimited(msg) => ApiError::AiRateLimited(msg),
            LLMError::Timeout(_) => ApiError::AiTimeout,
            other => ApiError::AiProviderFailed(other.to_string()),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::TokenExpired.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::InactiveUser.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::book_not_found(7).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::validation_error("bad").status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(ApiError::already_exists("dup").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::AiUnavailable.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            ApiError::AiProviderFailed("boom".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_llm_error_conversion() {
        assert!(matches!(ApiError::from(LLMError::NotConfigured), ApiError::AiUnavailable));
        assert!(matches!(
            ApiError::from(LLMError::RateLimited("slow down".into())),
            ApiError::AiRateLimited(_)
        ));
        assert!(matches!(
            ApiError::from(LLMError::Timeout("60s".into())),
            ApiError::AiTimeout
        ));
        assert!(matches!(
            ApiError::from(LLMError::EmptyResponse),
            ApiError::AiProviderFailed(_)
        ));
    }

    #[test]
    fn test_localized_message_defaults_to_english() {
        let err = ApiError::book_not_found(42);
        assert_eq!(err.localized_message(), "Book with id 42 not found");
    }
}
