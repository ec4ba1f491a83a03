//! Error types for rrv-api

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::SubmitError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Missing or invalid token (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Sentiment service failed or refused the review (400)
    #[error("Sentiment service error: {0}")]
    SentimentRejected(String),

    /// Internal server error (500); the message is safe to show clients
    #[error("Internal server error: {0}")]
    Internal(String),

    /// rrv-common error
    #[error("Common error: {0}")]
    Common(#[from] rrv_common::Error),
}

impl From<SubmitError> for ApiError {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::Validation(msg) => ApiError::BadRequest(msg),
            SubmitError::Sentiment { note } => ApiError::SentimentRejected(note),
            // Already logged with storage detail by the pipeline
            SubmitError::Storage { .. } => ApiError::Internal("Failed to save review".to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg, None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg, None),
            ApiError::SentimentRejected(note) => (
                StatusCode::BAD_REQUEST,
                "SENTIMENT_REJECTED",
                "Sentiment service error".to_string(),
                Some(note),
            ),
            ApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg, None)
            }
            ApiError::Common(ref err) => {
                tracing::error!("Unhandled common error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal error".to_string(),
                    None,
                )
            }
        };

        let mut error = json!({
            "code": error_code,
            "message": message,
        });
        if let Some(details) = details {
            error["details"] = json!(details);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
