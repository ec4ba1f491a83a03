//! rrv-api library - restaurant review ingestion service
//!
//! Exposes the router, state and services for the binary and for integration tests.

use axum::Router;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

pub mod api;
pub mod db;
pub mod error;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use crate::services::{ReviewPipeline, SentimentGateway};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Review ingestion pipeline
    pub pipeline: Arc<ReviewPipeline>,
    /// Key used to verify bearer tokens
    pub signing_key: Arc<str>,
}

impl AppState {
    /// Create new application state
    pub fn new(
        db: SqlitePool,
        sentiment: Arc<dyn SentimentGateway>,
        signing_key: impl Into<Arc<str>>,
    ) -> Self {
        let pipeline = Arc::new(ReviewPipeline::new(db, sentiment));
        Self {
            pipeline,
            signing_key: signing_key.into(),
        }
    }
}

/// Build application router
///
/// `request_timeout` bounds each request end to end; when it fires the handler
/// future is dropped and the client gets 408. Side effects already committed
/// (a stored review) are kept.
pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};

    // Protected routes (require a valid token)
    let protected = Router::new()
        .route("/user", get(api::get_current_user))
        .route("/user/feedback", post(api::submit_feedback))
        .route("/restaurants/:id/rating", get(api::get_restaurant_rating))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    // Public routes (no authentication)
    let public = Router::new().merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
