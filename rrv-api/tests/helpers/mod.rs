//! Shared helpers for rrv-api integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use rrv_api::services::{SentimentGateway, SentimentResult};
use rrv_common::db::init_database;
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub const SIGNING_KEY: &str = "integration-test-key";

/// Fresh migrated database in a temp dir; keep the `TempDir` alive for the test
pub async fn setup_test_db() -> (TempDir, SqlitePool) {
    let dir = TempDir::new().expect("Should create temp dir");
    let pool = init_database(&dir.path().join("reviews.db"))
        .await
        .expect("Should initialize test database");
    (dir, pool)
}

/// Sentiment stand-in returning a fixed result and counting calls
pub struct StubSentiment {
    result: SentimentResult,
    calls: AtomicUsize,
}

impl StubSentiment {
    pub fn approving(rating: f64) -> Arc<Self> {
        Arc::new(Self {
            result: SentimentResult {
                status: true,
                note: "stub".to_string(),
                rating,
            },
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(note: &str) -> Arc<Self> {
        Arc::new(Self {
            result: SentimentResult::failure(note),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SentimentGateway for StubSentiment {
    async fn classify(&self, _text: &str) -> SentimentResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

/// Sentiment stand-in that approves only after `delay`
pub struct SlowSentiment {
    delay: Duration,
}

impl SlowSentiment {
    pub fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self { delay })
    }
}

#[async_trait]
impl SentimentGateway for SlowSentiment {
    async fn classify(&self, _text: &str) -> SentimentResult {
        tokio::time::sleep(self.delay).await;
        SentimentResult {
            status: true,
            note: "slow stub".to_string(),
            rating: 4.0,
        }
    }
}
