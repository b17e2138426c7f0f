//! REST API helpers for communicating with the yak server.
//!
//! ARCHITECTURE
//! ============
//! Each operation is first a pure [`ApiRequest`] (method, path, body, auth
//! flag) built by the [`endpoint`] functions, then sent by [`ApiClient`].
//! The split keeps the route table checkable without a network.
//!
//! ERROR HANDLING
//! ==============
//! Transport failures come back as [`ClientError::Http`] and non-2xx
//! responses as [`ClientError::Status`]. Status codes are not interpreted
//! further and nothing is retried.

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;

use reqwest::header::AUTHORIZATION;
use reqwest::{Method, Url};
use serde_json::Value;

use super::types::{Credentials, Registration, error_message};
use crate::config::{ClientConfig, Timeouts};
use crate::error::ClientError;

/// Path prefix shared by every endpoint.
pub const API_PREFIX: [&str; 2] = ["api", "v1"];

/// Format of the `Authorization` header value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthScheme {
    /// `Bearer <token>`.
    #[default]
    Standard,
    /// `Bearer: <token>`, as sent by older web clients.
    LegacyColon,
}

impl AuthScheme {
    #[must_use]
    pub fn header_value(self, token: &str) -> String {
        match self {
            Self::Standard => format!("Bearer {token}"),
            Self::LegacyColon => format!("Bearer: {token}"),
        }
    }
}

/// One HTTP call, described without performing it.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path segments after `/api/v1`, unencoded.
    pub segments: Vec<String>,
    pub body: Option<Value>,
    /// Whether a bearer token must be attached.
    pub auth: bool,
}

impl ApiRequest {
    fn new(method: Method, segments: &[&str], auth: bool) -> Self {
        Self { method, segments: segments.iter().map(|s| (*s).to_owned()).collect(), body: None, auth }
    }

    fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Display path, e.g. `/api/v1/bets/groups/A`.
    #[must_use]
    pub fn path(&self) -> String {
        let mut path = String::new();
        for segment in API_PREFIX.iter().copied().chain(self.segments.iter().map(String::as_str)) {
            path.push('/');
            path.push_str(segment);
        }
        path
    }
}

/// Route table of the `/api/v1` namespace.
pub mod endpoint {
    use reqwest::Method;
    use serde_json::Value;

    use super::ApiRequest;
    use crate::net::types::{Credentials, Registration};

    #[must_use]
    pub fn signup(registration: &Registration) -> ApiRequest {
        ApiRequest::new(Method::POST, &["signup"], false).with_body(serde_json::json!({
            "name": registration.name,
            "first_name": registration.first_name,
            "last_name": registration.last_name,
            "password": registration.password,
        }))
    }

    #[must_use]
    pub fn login(credentials: &Credentials) -> ApiRequest {
        ApiRequest::new(Method::POST, &["login"], false).with_body(serde_json::json!({
            "name": credentials.name,
            "password": credentials.password,
        }))
    }

    #[must_use]
    pub fn group_names() -> ApiRequest {
        ApiRequest::new(Method::GET, &["groups", "names"], true)
    }

    #[must_use]
    pub fn group(group_name: &str) -> ApiRequest {
        ApiRequest::new(Method::GET, &["bets", "groups", group_name], true)
    }

    #[must_use]
    pub fn patch_scores(match_id: &str, payload: Value) -> ApiRequest {
        ApiRequest::new(Method::PATCH, &["bets", "scores", match_id], true).with_body(payload)
    }

    /// Older revisions submit predictions with `POST` on the same path.
    #[must_use]
    pub fn post_match(match_id: &str, payload: Value) -> ApiRequest {
        ApiRequest::new(Method::POST, &["bets", "scores", match_id], true).with_body(payload)
    }

    #[must_use]
    pub fn scores() -> ApiRequest {
        ApiRequest::new(Method::GET, &["bets", "scores"], true)
    }

    #[must_use]
    pub fn match_bet(match_id: &str) -> ApiRequest {
        ApiRequest::new(Method::GET, &["bets", "scores", match_id], true)
    }

    #[must_use]
    pub fn score_board() -> ApiRequest {
        ApiRequest::new(Method::GET, &["score_board"], true)
    }

    #[must_use]
    pub fn compute_points() -> ApiRequest {
        ApiRequest::new(Method::POST, &["compute_points"], true)
    }
}

/// Stateless HTTP client bound to one server origin.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    scheme: AuthScheme,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidBaseUrl`] when `base_url` does not parse
    /// or cannot carry a path, and [`ClientError::Http`] when the underlying
    /// client fails to build.
    pub fn new(base_url: &str, scheme: AuthScheme, timeouts: Timeouts) -> Result<Self, ClientError> {
        let parsed = Url::parse(base_url).map_err(|e| ClientError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
        if parsed.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl(base_url.to_owned()));
        }
        let http = reqwest::Client::builder()
            .timeout(timeouts.request())
            .connect_timeout(timeouts.connect())
            .build()?;
        Ok(Self { http, base_url: parsed, scheme })
    }

    /// # Errors
    ///
    /// See [`ApiClient::new`].
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        Self::new(&config.base_url, config.auth_scheme, config.timeouts)
    }

    /// Absolute URL for `request`, each segment percent-encoded.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidBaseUrl`] if the base URL cannot carry a path.
    pub fn url_for(&self, request: &ApiRequest) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(API_PREFIX)
            .extend(&request.segments);
        Ok(url)
    }

    /// Perform `request`, returning the decoded JSON body (`Null` when empty).
    ///
    /// # Errors
    ///
    /// - [`ClientError::MissingToken`] if the request needs auth and `token` is `None`
    /// - [`ClientError::Http`] on transport failure
    /// - [`ClientError::Status`] on a non-2xx response
    /// - [`ClientError::Json`] if a 2xx body is not JSON
    pub async fn send(&self, request: ApiRequest, token: Option<&str>) -> Result<Value, ClientError> {
        let url = self.url_for(&request)?;
        tracing::debug!(method = %request.method, path = %request.path(), "api request");

        let mut builder = self.http.request(request.method.clone(), url);
        if request.auth {
            let token = token.ok_or(ClientError::MissingToken)?;
            let value = reqwest::header::HeaderValue::from_str(&self.scheme.header_value(token))?;
            builder = builder.header(AUTHORIZATION, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), path = %request.path(), "api request failed");
            return Err(ClientError::Status { status: status.as_u16(), message: error_message(&text) });
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    /// `POST /signup`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn post_signup(&self, registration: &Registration) -> Result<Value, ClientError> {
        self.send(endpoint::signup(registration), None).await
    }

    /// `POST /login`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn post_login(&self, credentials: &Credentials) -> Result<Value, ClientError> {
        self.send(endpoint::login(credentials), None).await
    }

    /// `GET /groups/names`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn get_group_names(&self, token: Option<&str>) -> Result<Value, ClientError> {
        self.send(endpoint::group_names(), token).await
    }

    /// `GET /bets/groups/{group_name}`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn get_group(&self, group_name: &str, token: Option<&str>) -> Result<Value, ClientError> {
        self.send(endpoint::group(group_name), token).await
    }

    /// `PATCH /bets/scores/{match_id}`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn patch_scores(&self, match_id: &str, payload: Value, token: Option<&str>) -> Result<Value, ClientError> {
        self.send(endpoint::patch_scores(match_id, payload), token).await
    }

    /// `POST /bets/scores/{match_id}`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn post_match(&self, match_id: &str, payload: Value, token: Option<&str>) -> Result<Value, ClientError> {
        self.send(endpoint::post_match(match_id, payload), token).await
    }

    /// `GET /bets/scores`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn get_scores(&self, token: Option<&str>) -> Result<Value, ClientError> {
        self.send(endpoint::scores(), token).await
    }

    /// `GET /bets/scores/{match_id}`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn get_match(&self, match_id: &str, token: Option<&str>) -> Result<Value, ClientError> {
        self.send(endpoint::match_bet(match_id), token).await
    }

    /// `GET /score_board`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn get_score_board(&self, token: Option<&str>) -> Result<Value, ClientError> {
        self.send(endpoint::score_board(), token).await
    }

    /// `POST /compute_points`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn post_compute_points(&self, token: Option<&str>) -> Result<Value, ClientError> {
        self.send(endpoint::compute_points(), token).await
    }
}
