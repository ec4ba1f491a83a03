//! Current user endpoint

use axum::{Extension, Json};
use rrv_common::api::Claims;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub email: String,
    pub role: String,
}

/// GET /user
///
/// Echoes the identity carried by the verified token.
pub async fn get_current_user(Extension(claims): Extension<Claims>) -> Json<UserResponse> {
    Json(UserResponse {
        email: claims.email,
        role: claims.role,
    })
}
