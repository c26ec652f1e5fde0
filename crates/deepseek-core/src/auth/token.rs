//! Structural decoding of the bearer token's claims.
//!
//! The token is a JWT. Only the payload segment is read; the signature is
//! never verified since the client has no way to check the issuer.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::api::{ApiError, Result};

#[derive(Debug, Deserialize)]
struct Claims {
    exp: i64,
}

/// Read the `exp` claim of a JWT.
pub fn expiry(token: &str) -> Result<DateTime<Utc>> {
    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next(), segments.next(), segments.next()) {
        (Some(_), Some(payload), Some(_), None) if !payload.is_empty() => payload,
        _ => {
            return Err(ApiError::MalformedCredentials(
                "token is not a three-part JWT".to_string(),
            ))
        }
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| ApiError::MalformedCredentials(format!("token payload is not base64: {}", e)))?;

    let claims: Claims = serde_json::from_slice(&bytes)
        .map_err(|e| ApiError::MalformedCredentials(format!("token claims unreadable: {}", e)))?;

    DateTime::from_timestamp(claims.exp, 0).ok_or_else(|| {
        ApiError::MalformedCredentials(format!("token expiry {} out of range", claims.exp))
    })
}
