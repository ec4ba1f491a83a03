//! API module for shared HTTP API functionality
//!
//! # Design Principle
//!
//! This module contains ONLY pure functions and shared types, no HTTP framework
//! dependencies. The service crate wraps them in axum middleware.

pub mod auth;

pub use auth::{
    issue_token, token_from_authorization_header, token_from_cookie_header, verify_token,
    AuthError, Claims,
};
