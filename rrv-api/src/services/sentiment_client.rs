//! Sentiment service client
//!
//! Sends a review body to the external text-rating service and turns every
//! failure mode into a [`SentimentResult`] with `status: false`. Nothing raised
//! by the transport crosses this boundary.
//!
//! Wire contract:
//! - request: `POST <endpoint>` with `{"text": "<review body>"}`
//! - response: `{"review": <string>, "status": <bool>, "rating": <number 0..5>}`
//!
//! One attempt per call, bounded by the configured timeout. No retry.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("rrv-api/", env!("CARGO_PKG_VERSION"));

pub const NOTE_REQUEST_FAILED: &str = "failed to create request";
pub const NOTE_TIMEOUT: &str = "service timeout";
pub const NOTE_CONNECT_FAILED: &str = "failed to connect";
pub const NOTE_PARSE_FAILED: &str = "failed to parse response";

/// Outcome of one classification call
#[derive(Debug, Clone, PartialEq)]
pub struct SentimentResult {
    /// `false` on any failure, or when the service itself rejects the text
    pub status: bool,
    /// Failure reason, or the service's own text on success
    pub note: String,
    /// Sentiment-derived rating in [0,5]; 0 on failure
    pub rating: f64,
}

impl SentimentResult {
    pub fn failure(note: impl Into<String>) -> Self {
        Self {
            status: false,
            note: note.into(),
            rating: 0.0,
        }
    }
}

/// Boundary to the text classification service
#[async_trait]
pub trait SentimentGateway: Send + Sync {
    /// Classify `text`; never fails, failures come back as `status: false`
    async fn classify(&self, text: &str) -> SentimentResult;
}

/// Sentiment client construction errors
#[derive(Debug, Error)]
pub enum SentimentClientError {
    /// The underlying HTTP client could not be built
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
}

#[derive(Debug, Serialize)]
struct SentimentRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct SentimentResponse {
    review: String,
    status: bool,
    rating: f64,
}

/// HTTP implementation of [`SentimentGateway`]
pub struct HttpSentimentClient {
    http_client: reqwest::Client,
    endpoint: String,
}

impl HttpSentimentClient {
    /// Create a client for `endpoint` whose calls give up after `timeout`
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, SentimentClientError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| SentimentClientError::ClientBuild(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl SentimentGateway for HttpSentimentClient {
    async fn classify(&self, text: &str) -> SentimentResult {
        tracing::debug!(endpoint = %self.endpoint, len = text.len(), "Querying sentiment service");

        let response = match self
            .http_client
            .post(&self.endpoint)
            .json(&SentimentRequest { text })
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Sentiment request failed");
                return SentimentResult::failure(transport_failure_note(&e));
            }
        };

        let http_status = response.status();
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read sentiment response");
                return SentimentResult::failure(transport_failure_note(&e));
            }
        };

        match decode_response(&body) {
            Some(parsed) => {
                tracing::debug!(status = parsed.status, rating = parsed.rating, "Sentiment classified");
                SentimentResult {
                    status: parsed.status,
                    note: parsed.review,
                    rating: parsed.rating,
                }
            }
            None => {
                tracing::warn!(http_status = %http_status, "Undecodable sentiment response");
                SentimentResult::failure(NOTE_PARSE_FAILED)
            }
        }
    }
}

/// Map a reqwest error onto the failure taxonomy
fn transport_failure_note(err: &reqwest::Error) -> &'static str {
    if err.is_builder() {
        NOTE_REQUEST_FAILED
    } else if err.is_timeout() {
        NOTE_TIMEOUT
    } else {
        NOTE_CONNECT_FAILED
    }
}

/// Decode a response body; a rating outside [0,5] counts as a schema deviation
fn decode_response(body: &[u8]) -> Option<SentimentResponse> {
    let parsed: SentimentResponse = serde_json::from_slice(body).ok()?;
    if parsed.rating.is_finite() && (0.0..=5.0).contains(&parsed.rating) {
        Some(parsed)
    } else {
        None
    }
}
