//! Common error types for RRV

use thiserror::Error;

/// Common result type for RRV operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across RRV crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A schema migration step failed for a reason other than "already exists"
    #[error("Failed to apply migration {version} ({name}): {source}")]
    Migration {
        version: u32,
        name: &'static str,
        #[source]
        source: sqlx::Error,
    },

}
