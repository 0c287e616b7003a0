//! Locale extraction middleware
//!
//! Reads `Accept-Language` and scopes the resolved locale to the rest of
//! the request, including error rendering and LLM prompts.

use axum::{
    extract::Request,
    http::header::ACCEPT_LANGUAGE,
    middleware::Next,
    response::Response,
};

use crate::utils::{extract_locale_from_header, with_locale};

/// Middleware to extract locale from Accept-Language header
pub async fn locale_middleware(req: Request, next: Next) -> Response {
    let header = req
        .headers()
        .get(ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok());

    let locale = extract_locale_from_header(header);

    with_locale(&locale, next.run(req)).await
}
