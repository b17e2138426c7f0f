//! Client configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ClientError;
use crate::net::api::AuthScheme;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_STORAGE_PATH: &str = ".yak/session.json";
pub const DEFAULT_STORAGE_NAMESPACE: &str = "yak";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Timeouts {
    #[must_use]
    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    #[must_use]
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub storage_path: PathBuf,
    pub storage_namespace: String,
    pub auth_scheme: AuthScheme,
    pub erase_stale_token: bool,
    pub timeouts: Timeouts,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            storage_namespace: DEFAULT_STORAGE_NAMESPACE.to_owned(),
            auth_scheme: AuthScheme::Standard,
            erase_stale_token: true,
            timeouts: Timeouts {
                request_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
                connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            },
        }
    }
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// All optional:
    /// - `YAK_BASE_URL`: server origin, default `http://127.0.0.1:5000`
    /// - `YAK_STORAGE_PATH`: session file, default `.yak/session.json`
    /// - `YAK_STORAGE_NAMESPACE`: key prefix inside the session file, default `yak`
    /// - `YAK_LEGACY_BEARER`: send `Bearer: <token>` instead of `Bearer <token>`
    /// - `YAK_ERASE_STALE_TOKEN`: clear an expired token on redirect, default true
    /// - `YAK_REQUEST_TIMEOUT_SECS`: default 30
    /// - `YAK_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] when `YAK_BASE_URL` is set but empty.
    pub fn from_env() -> Result<Self, ClientError> {
        let defaults = Self::default();

        let base_url = normalize_base_url(&std::env::var("YAK_BASE_URL").unwrap_or(defaults.base_url))?;
        let storage_path = std::env::var("YAK_STORAGE_PATH").map_or(defaults.storage_path, PathBuf::from);
        let storage_namespace = std::env::var("YAK_STORAGE_NAMESPACE").unwrap_or(defaults.storage_namespace);
        let auth_scheme = if env_bool("YAK_LEGACY_BEARER").unwrap_or(false) {
            AuthScheme::LegacyColon
        } else {
            AuthScheme::Standard
        };
        let erase_stale_token = env_bool("YAK_ERASE_STALE_TOKEN").unwrap_or(defaults.erase_stale_token);
        let timeouts = Timeouts {
            request_secs: env_parse_u64("YAK_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("YAK_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { base_url, storage_path, storage_namespace, auth_scheme, erase_stale_token, timeouts })
    }
}

/// Trim whitespace and trailing slashes; reject an empty origin.
///
/// # Errors
///
/// Returns [`ClientError::Config`] when nothing is left after trimming.
pub fn normalize_base_url(raw: &str) -> Result<String, ClientError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ClientError::Config("base URL must not be empty".to_owned()));
    }
    Ok(trimmed.to_owned())
}

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}
