//! Review ingestion services

pub mod rating_aggregator;
pub mod review_pipeline;
pub mod sentiment_client;

pub use rating_aggregator::RatingAggregator;
pub use review_pipeline::{
    blend, PersistedReview, ReviewPipeline, ReviewSubmission, SubmissionStage, SubmitError,
};
pub use sentiment_client::{
    HttpSentimentClient, SentimentClientError, SentimentGateway, SentimentResult,
};
