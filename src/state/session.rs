//! Session store: the current token and display name, mirrored to storage.
//!
//! DESIGN
//! ======
//! The store is an owned value handed by reference to whatever needs it
//! (the route guard, call sites issuing API requests). Mutation happens only
//! through [`SessionStore::set_token`] and [`SessionStore::clear_session`],
//! which write storage first and memory second so a storage failure leaves
//! the in-memory session untouched.
//!
//! Actions that change the session take `&mut self` and mutate only after
//! their request resolves. Forwarding actions take `&self`, so independent
//! requests may be in flight together; they never touch session state.

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

use std::time::SystemTime;

use serde_json::Value;

use super::storage::TokenStorage;
use crate::error::ClientError;
use crate::jwt;
use crate::net::api::ApiClient;
use crate::net::types::{Credentials, LoginGrant, Registration};

/// In-memory session state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub token: Option<String>,
    pub user_name: String,
}

impl Session {
    /// A token is present and its expiry claim lies in the future.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        jwt::is_valid_jwt(self.token.as_deref())
    }

    #[must_use]
    pub fn is_authenticated_at(&self, now: SystemTime) -> bool {
        jwt::is_valid_jwt_at(self.token.as_deref(), now)
    }
}

pub struct SessionStore<S> {
    api: ApiClient,
    storage: S,
    session: Session,
}

impl<S: TokenStorage> SessionStore<S> {
    /// Empty session; storage is not read.
    #[must_use]
    pub fn new(api: ApiClient, storage: S) -> Self {
        Self { api, storage, session: Session::default() }
    }

    /// Session restored from a previously persisted token.
    ///
    /// The token is loaded as is; an expired one simply reads as
    /// unauthenticated. The display name is not persisted and starts empty.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when storage cannot be read.
    pub fn restore(api: ApiClient, storage: S) -> Result<Self, ClientError> {
        let token = storage.load()?;
        tracing::debug!(restored = token.is_some(), "session restored from storage");
        Ok(Self { api, storage, session: Session { token, user_name: String::new() } })
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.session.token.as_deref()
    }

    #[must_use]
    pub fn user_name(&self) -> &str {
        &self.session.user_name
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Record a token and display name in storage and memory.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when storage cannot be written; the session is unchanged.
    pub fn set_token(&mut self, token: String, user_name: String) -> Result<&Session, ClientError> {
        self.storage.save(&token)?;
        self.session = Session { token: Some(token), user_name };
        Ok(&self.session)
    }

    /// Erase token and display name from storage and memory.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when storage cannot be written; the session is unchanged.
    pub fn clear_session(&mut self) -> Result<&Session, ClientError> {
        self.storage.erase()?;
        self.session = Session::default();
        Ok(&self.session)
    }

    /// Authenticate and record the returned token.
    ///
    /// # Errors
    ///
    /// Returns the request error, or [`ClientError::MissingField`] when the
    /// response carries no token. The session is unchanged on error.
    pub async fn login(&mut self, credentials: &Credentials) -> Result<&Session, ClientError> {
        let body = match self.api.post_login(credentials).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(user = %credentials.name, error = %e, "login failed");
                return Err(e);
            }
        };

        let Some(grant) = LoginGrant::from_response(&body) else {
            tracing::warn!(user = %credentials.name, "login response carried no token");
            return Err(ClientError::MissingField("token"));
        };

        let user_name = grant.name.unwrap_or_else(|| credentials.name.clone());
        tracing::info!(user = %user_name, "login succeeded");
        self.set_token(grant.token, user_name)
    }

    /// Register, then log in with the same name and password.
    ///
    /// # Errors
    ///
    /// Returns the signup error without side effects, or any [`SessionStore::login`] error.
    pub async fn signup(&mut self, registration: &Registration) -> Result<&Session, ClientError> {
        if let Err(e) = self.api.post_signup(registration).await {
            tracing::warn!(user = %registration.name, error = %e, "signup failed");
            return Err(e);
        }
        tracing::info!(user = %registration.name, "signup succeeded");
        self.login(&registration.credentials()).await
    }

    /// Clear the session. Calling it again is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when storage cannot be written.
    pub fn logout(&mut self) -> Result<&Session, ClientError> {
        if self.session.token.is_some() {
            tracing::info!(user = %self.session.user_name, "logout");
        }
        self.clear_session()
    }

    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn get_group_names(&self) -> Result<Value, ClientError> {
        self.api.get_group_names(self.token()).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn get_group(&self, group_name: &str) -> Result<Value, ClientError> {
        self.api.get_group(group_name, self.token()).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn patch_scores(&self, match_id: &str, payload: Value) -> Result<Value, ClientError> {
        self.api.patch_scores(match_id, payload, self.token()).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn post_match(&self, match_id: &str, payload: Value) -> Result<Value, ClientError> {
        self.api.post_match(match_id, payload, self.token()).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn get_scores(&self) -> Result<Value, ClientError> {
        self.api.get_scores(self.token()).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn get_match(&self, match_id: &str) -> Result<Value, ClientError> {
        self.api.get_match(match_id, self.token()).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn get_score_board(&self) -> Result<Value, ClientError> {
        self.api.get_score_board(self.token()).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn compute_points(&self) -> Result<Value, ClientError> {
        self.api.post_compute_points(self.token()).await
    }
}
