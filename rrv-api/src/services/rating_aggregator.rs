//! Per-restaurant running rating aggregate
//!
//! Keeps `(average_rating, review_count)` as the only sufficient statistics and
//! updates them incrementally; historical reviews are never re-read.

use rrv_common::db::RatingAggregate;
use rrv_common::Result;
use sqlx::SqlitePool;

use crate::db;

/// Applies blended ratings to restaurant aggregates
#[derive(Clone)]
pub struct RatingAggregator {
    db: SqlitePool,
}

impl RatingAggregator {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Fold `blended_rating` into the aggregate for `restaurant_id`
    ///
    /// Creates the aggregate on the first rating. Safe under concurrent callers
    /// for the same restaurant: the update is a single atomic upsert.
    pub async fn apply_new_rating(
        &self,
        restaurant_id: &str,
        blended_rating: f64,
    ) -> Result<RatingAggregate> {
        let aggregate = db::upsert_rating(&self.db, restaurant_id, blended_rating).await?;

        tracing::debug!(
            restaurant_id = %restaurant_id,
            average = aggregate.average_rating,
            count = aggregate.review_count,
            "Rating aggregate updated"
        );

        Ok(aggregate)
    }

    /// Current aggregate, `None` before the first review
    pub async fn get_rating(&self, restaurant_id: &str) -> Result<Option<RatingAggregate>> {
        db::get_rating(&self.db, restaurant_id).await
    }
}
