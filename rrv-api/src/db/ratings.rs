//! Rating aggregate persistence
//!
//! The aggregate is updated with a single upsert so the read of the current
//! `(average_rating, review_count)` pair and the write of the new pair happen
//! inside one statement, under SQLite's write lock. Two submissions for the
//! same restaurant can therefore never compute their increment from the same
//! stale count.

use rrv_common::db::RatingAggregate;
use rrv_common::Result;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Fold one blended rating into the restaurant's aggregate and return the new row
///
/// First rating: `{average: rating, count: 1}`.
/// Otherwise: `average' = (average * count + rating) / (count + 1)`, `count' = count + 1`.
/// Column references on the right-hand side of `DO UPDATE SET` see the row as it
/// was before this statement.
pub async fn upsert_rating(
    pool: &SqlitePool,
    restaurant_id: &str,
    rating: f64,
) -> Result<RatingAggregate> {
    let aggregate = sqlx::query_as::<_, RatingAggregate>(
        r#"
        INSERT INTO ratings (id, restaurant_id, average_rating, review_count)
        VALUES (?, ?, ?, 1)
        ON CONFLICT(restaurant_id) DO UPDATE SET
            average_rating = (ratings.average_rating * ratings.review_count + excluded.average_rating)
                / (ratings.review_count + 1),
            review_count = ratings.review_count + 1
        RETURNING restaurant_id, average_rating, review_count
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(restaurant_id)
    .bind(rating)
    .fetch_one(pool)
    .await?;

    Ok(aggregate)
}

/// Current aggregate for a restaurant, if any review has been recorded
pub async fn get_rating(pool: &SqlitePool, restaurant_id: &str) -> Result<Option<RatingAggregate>> {
    let aggregate = sqlx::query_as::<_, RatingAggregate>(
        "SELECT restaurant_id, average_rating, review_count FROM ratings WHERE restaurant_id = ?",
    )
    .bind(restaurant_id)
    .fetch_optional(pool)
    .await?;

    Ok(aggregate)
}
