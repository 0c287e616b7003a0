use std::sync::Arc;

use axum::{
    Form, Json, async_trait,
    extract::{FromRequest, Request, State},
    http::{StatusCode, header::CONTENT_TYPE},
};

use crate::AppState;
use crate::models::{LoginRequest, RegisterRequest, TokenResponse, UserResponse};
use crate::utils::{ApiError, ApiResult, ValidatedJson};

/// Register a new account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = UserResponse),
        (status = 400, description = "Email or username already in use"),
        (status = 422, description = "Validation error"),
    ),
    tag = "Authentication"
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    tracing::info!("Registration attempt for username: {}", payload.username);
    let user = state.auth_service.register(payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Exchange username (or email) and password for an access token
///
/// Accepts an OAuth2 password-flow form or a JSON body.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body(
        content = LoginRequest,
        content_type = "application/x-www-form-urlencoded",
        description = "Also accepted as application/json"
    ),
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "Incorrect username or password"),
        (status = 403, description = "Inactive user"),
    ),
    tag = "Authentication"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    LoginPayload(payload): LoginPayload,
) -> ApiResult<Json<TokenResponse>> {
    tracing::info!("Login attempt for: {}", payload.username);
    let token = state.auth_service.login(payload).await?;
    Ok(Json(token))
}

/// Login body from either a form or JSON, chosen by Content-Type
pub struct LoginPayload(pub LoginRequest);

#[async_trait]
impl<S> FromRequest<S> for LoginPayload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/json"));

        let payload = if is_json {
            Json::<LoginRequest>::from_request(req, state)
                .await
                .map(|Json(payload)| payload)
                .map_err(|rejection| ApiError::validation_error(rejection.body_text()))?
        } else {
            Form::<LoginRequest>::from_request(req, state)
                .await
                .map(|Form(payload)| payload)
                .map_err(|rejection| ApiError::validation_error(rejection.body_text()))?
        };

        Ok(Self(payload))
    }
}
