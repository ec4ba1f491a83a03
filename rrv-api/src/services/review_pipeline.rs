//! Review ingestion pipeline
//!
//! One submission runs through
//! `Validating -> Scoring -> Blending -> Persisting -> Aggregating -> Done`;
//! a failure in any stage ends the submission immediately. No stage is retried.
//! Blending cannot fail, so it has no [`SubmissionStage`] variant.
//!
//! # Two-step write
//!
//! The review row and the restaurant aggregate are written separately, review
//! first. If the aggregate write fails the review stays stored and the aggregate
//! misses that rating. The error reports [`SubmissionStage::Aggregating`] so the
//! caller can tell this case apart from a failed review insert.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use rrv_common::db::Review;

use crate::db;
use crate::services::rating_aggregator::RatingAggregator;
use crate::services::sentiment_client::SentimentGateway;

/// Weight of the caller's star rating in the blended score
pub const STAR_WEIGHT: f64 = 0.7;
/// Weight of the sentiment-derived rating in the blended score
pub const SENTIMENT_WEIGHT: f64 = 0.3;

pub const MIN_RATING: f64 = 0.0;
pub const MAX_RATING: f64 = 5.0;

/// Incoming review as submitted by a client
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSubmission {
    /// Client-supplied id; generated when absent or empty
    #[serde(default)]
    pub id: Option<String>,
    pub user_id: String,
    pub restaurant_id: String,
    pub text: String,
    pub rating: f64,
}

/// What the caller gets back for a stored review
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersistedReview {
    #[serde(rename = "review")]
    pub id: String,
    /// Blended rating as stored
    pub rating: f64,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Pipeline stages, used to label failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStage {
    Validating,
    Scoring,
    Persisting,
    Aggregating,
}

impl fmt::Display for SubmissionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SubmissionStage::Validating => "validating",
            SubmissionStage::Scoring => "scoring",
            SubmissionStage::Persisting => "persisting",
            SubmissionStage::Aggregating => "aggregating",
        };
        f.write_str(name)
    }
}

/// Submission failure
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Rejected before any external call
    #[error("{0}")]
    Validation(String),

    /// Sentiment service unavailable or refused the text; nothing was stored
    #[error("Sentiment service error: {note}")]
    Sentiment { note: String },

    /// Store failure while persisting or aggregating
    #[error("Failed while {stage}: {source}")]
    Storage {
        stage: SubmissionStage,
        #[source]
        source: rrv_common::Error,
    },
}

impl SubmitError {
    /// Stage the submission was in when it failed
    pub fn stage(&self) -> SubmissionStage {
        match self {
            SubmitError::Validation(_) => SubmissionStage::Validating,
            SubmitError::Sentiment { .. } => SubmissionStage::Scoring,
            SubmitError::Storage { stage, .. } => *stage,
        }
    }

    /// Whether the review row was written before the failure
    pub fn review_persisted(&self) -> bool {
        self.stage() == SubmissionStage::Aggregating
    }
}

/// Weighted blend of star and sentiment ratings, clamped to [0,5]
///
/// # Examples
///
/// ```
/// use rrv_api::services::review_pipeline::blend;
///
/// assert!((blend(0.0, 5.0) - 1.5).abs() < 1e-9);
/// assert!((blend(5.0, 0.0) - 3.5).abs() < 1e-9);
/// assert_eq!(blend(5.0, 5.0), 5.0);
/// ```
pub fn blend(star_rating: f64, sentiment_rating: f64) -> f64 {
    (star_rating * STAR_WEIGHT + sentiment_rating * SENTIMENT_WEIGHT).clamp(MIN_RATING, MAX_RATING)
}

/// Fail-fast input checks, in order
fn validate(submission: &ReviewSubmission) -> Result<(), SubmitError> {
    if submission.text.is_empty() {
        return Err(SubmitError::Validation("Review text is required".to_string()));
    }
    // NaN fails the range check
    if !(MIN_RATING..=MAX_RATING).contains(&submission.rating) {
        return Err(SubmitError::Validation(
            "Rating must be between 0 and 5".to_string(),
        ));
    }
    if submission.restaurant_id.trim().is_empty() {
        return Err(SubmitError::Validation(
            "Restaurant id is required".to_string(),
        ));
    }
    Ok(())
}

/// Validates, scores, blends, stores and aggregates review submissions
pub struct ReviewPipeline {
    db: SqlitePool,
    sentiment: Arc<dyn SentimentGateway>,
    aggregator: RatingAggregator,
}

impl ReviewPipeline {
    pub fn new(db: SqlitePool, sentiment: Arc<dyn SentimentGateway>) -> Self {
        let aggregator = RatingAggregator::new(db.clone());
        Self {
            db,
            sentiment,
            aggregator,
        }
    }

    pub fn aggregator(&self) -> &RatingAggregator {
        &self.aggregator
    }

    /// Run one submission to completion
    pub async fn submit(&self, submission: ReviewSubmission) -> Result<PersistedReview, SubmitError> {
        validate(&submission)?;

        let sentiment = self.sentiment.classify(&submission.text).await;
        if !sentiment.status {
            tracing::warn!(
                restaurant_id = %submission.restaurant_id,
                note = %sentiment.note,
                "Review rejected at scoring stage"
            );
            return Err(SubmitError::Sentiment {
                note: sentiment.note,
            });
        }

        let blended = blend(submission.rating, sentiment.rating);

        let id = submission
            .id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let review = Review {
            id,
            user_id: submission.user_id,
            restaurant_id: submission.restaurant_id,
            text: submission.text,
            rating: blended,
            created_at: Utc::now(),
        };

        db::insert_review(&self.db, &review)
            .await
            .map_err(|source| storage_failure(SubmissionStage::Persisting, &review, source))?;

        let aggregate = self
            .aggregator
            .apply_new_rating(&review.restaurant_id, blended)
            .await
            .map_err(|source| storage_failure(SubmissionStage::Aggregating, &review, source))?;

        tracing::info!(
            review_id = %review.id,
            restaurant_id = %review.restaurant_id,
            star = submission.rating,
            sentiment = sentiment.rating,
            blended,
            review_count = aggregate.review_count,
            "Review stored"
        );

        Ok(PersistedReview {
            id: review.id,
            rating: review.rating,
            text: review.text,
            created_at: review.created_at,
        })
    }
}

fn storage_failure(stage: SubmissionStage, review: &Review, source: rrv_common::Error) -> SubmitError {
    if stage == SubmissionStage::Aggregating {
        tracing::error!(
            review_id = %review.id,
            restaurant_id = %review.restaurant_id,
            error = %source,
            "Review stored but aggregate not updated"
        );
    } else {
        tracing::error!(review_id = %review.id, error = %source, "Failed to store review");
    }
    SubmitError::Storage { stage, source }
}
