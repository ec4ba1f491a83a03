//! # RRV Common Library
//!
//! Shared code for the restaurant review service including:
//! - Database initialization and the schema migration ledger
//! - Persisted record models
//! - Service configuration loading
//! - Bearer token verification

pub mod api;
pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
