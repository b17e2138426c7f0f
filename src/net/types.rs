//! Request bodies and response shapes exchanged with the server.
//!
//! Group, match and leaderboard payloads stay as `serde_json::Value`; only
//! the login response and error envelope are read by the client.

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub name: String,
    pub password: String,
}

/// Body of `POST /signup`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

impl Registration {
    /// Credentials used to log in right after a successful signup.
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        Credentials { name: self.name.clone(), password: self.password.clone() }
    }
}

/// Body of a score prediction (`PATCH`/`POST /bets/scores/{match_id}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorePrediction {
    pub team1: TeamScore,
    pub team2: TeamScore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamScore {
    pub score: Option<u32>,
}

impl ScorePrediction {
    #[must_use]
    pub fn new(score1: Option<u32>, score2: Option<u32>) -> Self {
        Self { team1: TeamScore { score: score1 }, team2: TeamScore { score: score2 } }
    }
}

/// Token and display name extracted from a login response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginGrant {
    pub token: String,
    pub name: Option<String>,
}

impl LoginGrant {
    /// Read a login response in either server shape:
    /// `{ "token": ... }` or `{ "ok": true, "result": { "name": ..., "token": ... } }`.
    #[must_use]
    pub fn from_response(body: &Value) -> Option<Self> {
        let source = body.get("result").filter(|r| r.is_object()).unwrap_or(body);
        let token = source.get("token").and_then(Value::as_str)?.to_owned();
        let name = source.get("name").and_then(Value::as_str).map(str::to_owned);
        Some(Self { token, name })
    }
}

/// Failure envelope: `{ "ok": false, "error_code": ..., "description": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(default)]
    pub ok: bool,
    pub description: String,
}

/// Human-readable message for a non-2xx body: the description of a
/// failure envelope (`ok` false or absent), the raw text otherwise.
#[must_use]
pub fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) if !envelope.ok => envelope.description,
        _ => body.trim().to_owned(),
    }
}
