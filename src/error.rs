//! Error type shared by the API client, session store and CLI.

/// Failure of a client operation.
///
/// Malformed and expired tokens are not represented here: both surface as
/// `SessionStore::is_authenticated() == false`.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("missing session token; run `yak login` first")]
    MissingToken,
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("missing expected field `{0}`")]
    MissingField(&'static str),
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("session storage failed: {0}")]
    Storage(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// HTTP status code for [`ClientError::Status`], `None` otherwise.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
