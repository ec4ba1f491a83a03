//! Review submission endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::error::{ApiError, ApiResult};
use crate::services::{PersistedReview, ReviewSubmission};
use crate::AppState;

/// POST /user/feedback
///
/// Body: `{id?, userId, restaurantId, text, rating}`.
/// Response: `{review, rating, text, created_at}` with the blended rating.
pub async fn submit_feedback(
    State(state): State<AppState>,
    payload: Result<Json<ReviewSubmission>, JsonRejection>,
) -> ApiResult<Json<PersistedReview>> {
    let Json(submission) = payload.map_err(|e| {
        tracing::debug!("Rejected review body: {}", e);
        ApiError::BadRequest("Invalid request body".to_string())
    })?;

    let stored = state.pipeline.submit(submission).await?;
    Ok(Json(stored))
}
