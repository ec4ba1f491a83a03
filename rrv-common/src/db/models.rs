//! Database models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted review row
///
/// `rating` is the blended score, not the caller's star rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub user_id: String,
    pub restaurant_id: String,
    pub text: String,
    pub rating: f64,
    pub created_at: DateTime<Utc>,
}

/// Running per-restaurant rating aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RatingAggregate {
    pub restaurant_id: String,
    pub average_rating: f64,
    pub review_count: i64,
}
