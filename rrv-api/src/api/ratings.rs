//! Restaurant rating lookup

use axum::{
    extract::{Path, State},
    Json,
};
use rrv_common::db::RatingAggregate;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// GET /restaurants/:id/rating
pub async fn get_restaurant_rating(
    State(state): State<AppState>,
    Path(restaurant_id): Path<String>,
) -> ApiResult<Json<RatingAggregate>> {
    state
        .pipeline
        .aggregator()
        .get_rating(&restaurant_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No rating for restaurant {}", restaurant_id)))
}
