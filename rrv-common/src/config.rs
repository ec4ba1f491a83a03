//! Service configuration loading
//!
//! Resolution order for every option:
//! 1. Command-line argument (highest priority, applied by the binary)
//! 2. Environment variable (applied by the binary through clap `env`)
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Nothing here is process-global: the resolved [`ServiceConfig`] is handed to
//! each component when it is constructed.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Config file picked up from the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "rrv.toml";

/// Resolved service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Socket address the HTTP listener binds to
    pub bind_address: String,
    /// SQLite database file
    pub database_path: PathBuf,
    /// Sentiment service endpoint (`POST {"text": ...}`)
    pub sentiment_endpoint: String,
    /// Deadline for one sentiment call
    pub sentiment_timeout_secs: u64,
    /// End-to-end deadline for one HTTP request
    pub request_timeout_secs: u64,
    /// HS512 key used to verify bearer tokens
    pub jwt_signing_key: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            database_path: PathBuf::from("./rrv_data/reviews.db"),
            sentiment_endpoint: "http://127.0.0.1:8000/rate".to_string(),
            sentiment_timeout_secs: 5,
            request_timeout_secs: 15,
            jwt_signing_key: None,
        }
    }
}

impl ServiceConfig {
    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))
    }

    /// Load configuration from an explicit file, or from [`DEFAULT_CONFIG_FILE`] if present
    ///
    /// An explicit path that cannot be read is an error; a missing default file is not.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let path = match explicit_path {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    info!("No config file found, using defaults");
                    return Ok(Self::default());
                }
                default
            }
        };

        let content = std::fs::read_to_string(&path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        info!("Loaded configuration from {}", path.display());
        Self::from_toml_str(&content)
    }

    /// Check the options every component relies on
    pub fn validate(&self) -> Result<()> {
        self.signing_key()?;

        if self.sentiment_timeout_secs == 0 {
            return Err(Error::Config(
                "sentiment_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(Error::Config(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.sentiment_endpoint.trim().is_empty() {
            return Err(Error::Config("sentiment_endpoint is empty".to_string()));
        }

        Ok(())
    }

    /// Signing key for token verification; there is no fallback key
    pub fn signing_key(&self) -> Result<&str> {
        match self.jwt_signing_key.as_deref() {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(Error::Config(
                "jwt_signing_key is required (set RRV_JWT_SIGNING_KEY)".to_string(),
            )),
        }
    }

    pub fn sentiment_timeout(&self) -> Duration {
        Duration::from_secs(self.sentiment_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config = ServiceConfig::from_toml_str("").unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.sentiment_timeout(), Duration::from_secs(5));
        assert_eq!(config.request_timeout(), Duration::from_secs(15));
    }

    #[test]
    fn test_partial_toml_overrides_only_given_keys() {
        let config = ServiceConfig::from_toml_str(
            r#"
            sentiment_endpoint = "http://nlp.internal:9000/rate"
            jwt_signing_key = "secret"
            "#,
        )
        .unwrap();

        assert_eq!(config.sentiment_endpoint, "http://nlp.internal:9000/rate");
        assert_eq!(config.signing_key().unwrap(), "secret");
        assert_eq!(config.bind_address, "0.0.0.0:8080");
    }

    #[test]
    fn test_missing_signing_key_fails_validation() {
        let config = ServiceConfig::default();
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = ServiceConfig {
            jwt_signing_key: Some(String::new()),
            ..ServiceConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeouts_rejected() {
        let config = ServiceConfig {
            jwt_signing_key: Some("k".to_string()),
            sentiment_timeout_secs: 0,
            ..ServiceConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ServiceConfig {
            jwt_signing_key: Some("k".to_string()),
            request_timeout_secs: 0,
            ..ServiceConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let result = ServiceConfig::from_toml_str("sentiment_timeout_secs = \"soon\"");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let result = ServiceConfig::load(Some(Path::new("/nonexistent/rrv.toml")));
        assert!(result.is_err());
    }
}
