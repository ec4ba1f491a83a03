//! Bearer token verification
//!
//! Tokens are HS512 JWTs carrying `{email, role, exp}`. The only contract the
//! service relies on is pass/fail: a token signed with the configured key and not
//! yet expired passes, anything else fails.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Claims carried by a service token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    pub role: String,
    /// Expiry, seconds since the Unix epoch
    pub exp: u64,
}

/// Authentication error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No token in cookie or Authorization header
    #[error("Missing token")]
    MissingToken,

    /// Token is past its `exp`
    #[error("Token expired")]
    Expired,

    /// Bad signature, wrong algorithm, malformed token or claims
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Token could not be signed
    #[error("Failed to issue token: {0}")]
    Issue(String),
}

/// Sign a token for `email`/`role` valid for `ttl`
///
/// # Examples
///
/// ```
/// use rrv_common::api::auth::{issue_token, verify_token};
///
/// let token = issue_token("a@b.c", "user", "key", chrono::Duration::hours(1)).unwrap();
/// let claims = verify_token(&token, "key").unwrap();
/// assert_eq!(claims.email, "a@b.c");
/// ```
pub fn issue_token(
    email: &str,
    role: &str,
    signing_key: &str,
    ttl: Duration,
) -> Result<String, AuthError> {
    let expires_at = Utc::now()
        .checked_add_signed(ttl)
        .ok_or_else(|| AuthError::Issue(format!("token lifetime out of range: {}", ttl)))?;
    let exp = expires_at.timestamp().max(0) as u64;
    let claims = Claims {
        email: email.to_string(),
        role: role.to_string(),
        exp,
    };

    encode(
        &Header::new(Algorithm::HS512),
        &claims,
        &EncodingKey::from_secret(signing_key.as_bytes()),
    )
    .map_err(|e| AuthError::Issue(e.to_string()))
}

/// Verify signature, algorithm and expiry; return the claims on success
pub fn verify_token(token: &str, signing_key: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS512);
    validation.leeway = 0;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(signing_key.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::Expired,
        _ => AuthError::InvalidToken(e.to_string()),
    })
}

/// Pull a token out of a `Cookie` header value (`jwt=<token>`)
pub fn token_from_cookie_header(cookie_header: &str) -> Option<&str> {
    cookie_header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == "jwt")
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

/// Pull a token out of an `Authorization` header value (`Bearer <token>`)
pub fn token_from_authorization_header(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "test-signing-key";

    #[test]
    fn test_issued_token_verifies() {
        let token = issue_token("diner@example.com", "user", KEY, Duration::hours(24)).unwrap();
        let claims = verify_token(&token, KEY).unwrap();

        assert_eq!(claims.email, "diner@example.com");
        assert_eq!(claims.role, "user");
    }

    #[test]
    fn test_wrong_key_rejected() {
        let token = issue_token("diner@example.com", "user", KEY, Duration::hours(1)).unwrap();
        let result = verify_token(&token, "another-key");

        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = issue_token("diner@example.com", "user", KEY, Duration::hours(-1)).unwrap();
        assert_eq!(verify_token(&token, KEY), Err(AuthError::Expired));
    }

    #[test]
    fn test_out_of_range_ttl_is_issue_error() {
        let ttl = Duration::try_weeks(1_000_000_000).unwrap();
        let result = issue_token("diner@example.com", "user", KEY, ttl);

        assert!(matches!(result, Err(AuthError::Issue(_))));
    }

    #[test]
    fn test_hs256_token_rejected() {
        let claims = Claims {
            email: "diner@example.com".to_string(),
            role: "user".to_string(),
            exp: (Utc::now() + Duration::hours(1)).timestamp() as u64,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(KEY.as_bytes()),
        )
        .unwrap();

        assert!(matches!(verify_token(&token, KEY), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(verify_token("not.a.token", KEY).is_err());
        assert!(verify_token("", KEY).is_err());
    }

    #[test]
    fn test_cookie_extraction() {
        assert_eq!(token_from_cookie_header("jwt=abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(
            token_from_cookie_header("theme=dark; jwt=abc.def.ghi; lang=uk"),
            Some("abc.def.ghi")
        );
        assert_eq!(token_from_cookie_header("theme=dark"), None);
        assert_eq!(token_from_cookie_header("jwt="), None);
    }

    #[test]
    fn test_bearer_extraction() {
        assert_eq!(token_from_authorization_header("Bearer abc"), Some("abc"));
        assert_eq!(token_from_authorization_header("Basic abc"), None);
        assert_eq!(token_from_authorization_header("Bearer "), None);
    }
}
