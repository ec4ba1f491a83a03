//! Database access layer for rrv-api
//!
//! Queries for the two tables this service writes: `reviews` and `ratings`.

pub mod ratings;
pub mod reviews;

pub use ratings::{get_rating, upsert_rating};
pub use reviews::{get_review, insert_review};
