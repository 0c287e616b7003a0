//! Request extractors that turn malformed or invalid input into 422 responses

use axum::{
    Json,
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
};
use serde::{Deserialize, de::DeserializeOwned};
use utoipa::IntoParams;
use validator::{Validate, ValidationErrors};

use crate::config::PaginationConfig;
use crate::utils::{ApiError, ApiResult};

/// JSON body extractor that also runs `validator` rules
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::validation_error(rejection.body_text()))?;

        value
            .validate()
            .map_err(|errors| ApiError::validation_error(describe_errors(&errors)))?;

        Ok(Self(value))
    }
}

/// Query string extractor with JSON error bodies
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::validation_error(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Path parameter extractor; a malformed segment becomes a 422 like any other bad input
pub struct ApiPath<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::validation_error(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Flatten validator output into `field: reason` pairs, sorted by field
pub fn describe_errors(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let reasons: Vec<String> = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            format!("{}: {}", field, reasons.join(", "))
        })
        .collect();
    parts.sort();
    parts.join("; ")
}

#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
pub struct PaginationParams {
    /// Number of records to skip
    pub skip: Option<i64>,
    /// Maximum number of records to return
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub skip: i64,
    pub limit: i64,
}

impl PaginationParams {
    pub fn resolve(&self, config: &PaginationConfig) -> ApiResult<Pagination> {
        let skip = self.skip.unwrap_or(0);
        if skip < 0 {
            return Err(ApiError::validation_error("skip: must be greater than or equal to 0"));
        }

        let limit = self.limit.unwrap_or(config.default_page_size as i64);
        let max = config.max_page_size as i64;
        if !(1..=max).contains(&limit) {
            return Err(ApiError::validation_error(format!(
                "limit: must be between 1 and {}",
                max
            )));
        }

        Ok(Pagination { skip, limit })
    }
}
