//! HTTP API handlers for rrv-api

pub mod auth;
pub mod health;
pub mod ratings;
pub mod reviews;
pub mod user;

pub use auth::auth_middleware;
pub use health::health_routes;
pub use ratings::get_restaurant_rating;
pub use reviews::submit_feedback;
pub use user::get_current_user;
