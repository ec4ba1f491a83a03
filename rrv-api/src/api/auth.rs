//! Authentication middleware for rrv-api
//!
//! Every protected route requires a valid token, taken from the `jwt` cookie or
//! an `Authorization: Bearer` header. Verified claims are attached to the
//! request as an extension for downstream handlers.

use axum::{
    extract::{Request, State},
    http::header::{AUTHORIZATION, COOKIE},
    middleware::Next,
    response::Response,
};
use rrv_common::api::auth::{
    token_from_authorization_header, token_from_cookie_header, verify_token, AuthError,
};
use tracing::warn;

use crate::error::ApiError;
use crate::AppState;

/// Reject the request with 401 unless it carries a valid token
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = extract_token(&request)
        .ok_or(AuthError::MissingToken)
        .and_then(|token| verify_token(token, &state.signing_key))
        .map_err(|e| {
            warn!(path = %request.uri().path(), "Authentication failed: {}", e);
            ApiError::Unauthorized(e.to_string())
        })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Cookie first, then bearer header
fn extract_token(request: &Request) -> Option<&str> {
    let headers = request.headers();

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(token_from_cookie_header)
        .or_else(|| {
            headers
                .get(AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .and_then(token_from_authorization_header)
        })
}
