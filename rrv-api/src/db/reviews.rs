//! Review persistence

use rrv_common::db::Review;
use rrv_common::Result;
use sqlx::SqlitePool;

/// Insert a review row; rows are never updated afterwards
pub async fn insert_review(pool: &SqlitePool, review: &Review) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO reviews (id, user_id, restaurant_id, text, rating, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&review.id)
    .bind(&review.user_id)
    .bind(&review.restaurant_id)
    .bind(&review.text)
    .bind(review.rating)
    .bind(review.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load a review by id
pub async fn get_review(pool: &SqlitePool, id: &str) -> Result<Option<Review>> {
    let review = sqlx::query_as::<_, Review>(
        "SELECT id, user_id, restaurant_id, text, rating, created_at FROM reviews WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(review)
}
