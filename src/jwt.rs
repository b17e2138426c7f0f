//! JWT freshness check.
//!
//! DESIGN
//! ======
//! Only the payload segment is inspected. The signature is never verified,
//! so a passing check means "not yet expired", not "issued by the server".
//! The server still rejects forged tokens on every authenticated call.

#[cfg(test)]
#[path = "jwt_test.rs"]
mod tests;

use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::Value;

/// Error returned by [`decode_claims`].
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("token has {0} segments, expected 3")]
    Malformed(usize),
    #[error("payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("payload has no numeric `exp` claim")]
    MissingExp,
}

/// Claims read from a token payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Claims {
    /// Expiry, seconds since the Unix epoch.
    pub exp: f64,
    pub iat: Option<f64>,
    pub sub: Option<Value>,
}

impl Claims {
    /// Expiry converted to epoch milliseconds.
    #[must_use]
    pub fn exp_ms(&self) -> f64 {
        self.exp * 1000.0
    }

    /// Whether `now` is strictly before the expiry instant.
    #[must_use]
    pub fn is_fresh_at(&self, now: SystemTime) -> bool {
        system_time_ms(now) < self.exp_ms()
    }
}

/// Decode the payload segment of `token` without verifying its signature.
///
/// # Errors
///
/// Returns [`JwtError`] when the token has fewer than three segments, the
/// payload is not base64, the decoded bytes are not JSON, or `exp` is absent.
pub fn decode_claims(token: &str) -> Result<Claims, JwtError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() < 3 {
        return Err(JwtError::Malformed(segments.len()));
    }

    let bytes = decode_segment(segments[1])?;
    let payload: Value = serde_json::from_slice(&bytes)?;
    let exp = payload.get("exp").and_then(Value::as_f64).ok_or(JwtError::MissingExp)?;

    Ok(Claims { exp, iat: payload.get("iat").and_then(Value::as_f64), sub: payload.get("sub").cloned() })
}

/// Whether `token` is present, well formed and not yet expired.
#[must_use]
pub fn is_valid_jwt(token: Option<&str>) -> bool {
    is_valid_jwt_at(token, SystemTime::now())
}

/// [`is_valid_jwt`] evaluated against an explicit clock reading.
#[must_use]
pub fn is_valid_jwt_at(token: Option<&str>, now: SystemTime) -> bool {
    let Some(token) = token.filter(|t| !t.is_empty()) else {
        return false;
    };
    decode_claims(token).is_ok_and(|claims| claims.is_fresh_at(now))
}

/// Accepts both base64 alphabets, with or without padding.
fn decode_segment(segment: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let normalized: String = segment
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();
    URL_SAFE_NO_PAD.decode(normalized)
}

#[allow(clippy::cast_precision_loss)]
fn system_time_ms(now: SystemTime) -> f64 {
    match now.duration_since(UNIX_EPOCH) {
        Ok(duration) => duration.as_millis() as f64,
        Err(before) => -(before.duration().as_millis() as f64),
    }
}
