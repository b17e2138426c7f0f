//! Views and the authentication guard run before every navigation.
//!
//! The guard has two logical states, authenticated and unauthenticated.
//! Navigation to login or signup always proceeds; anything else proceeds
//! only when authenticated and is otherwise redirected to login. There is
//! no queuing or retry.

#[cfg(test)]
#[path = "router_test.rs"]
mod tests;

use std::fmt;

use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};

use crate::state::session::SessionStore;
use crate::state::storage::TokenStorage;

/// Characters escaped in a path segment: the URL path-segment set.
const SEGMENT: &AsciiSet =
    &CONTROLS.add(b' ').add(b'"').add(b'#').add(b'%').add(b'/').add(b'<').add(b'>').add(b'?').add(b'`').add(b'{').add(b'}');

/// A navigable view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Signup,
    Logout,
    Group { group_name: String },
    ScoreBoard,
}

impl Route {
    /// Parse a view path such as `/groups/A`. Segments are percent-decoded;
    /// unknown paths and segments that do not decode to UTF-8 yield `None`.
    #[must_use]
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| percent_decode_str(s).decode_utf8().ok())
            .collect::<Option<Vec<_>>>()?;
        let segments: Vec<&str> = segments.iter().map(|s| &**s).collect();
        match segments.as_slice() {
            [] => Some(Self::Home),
            ["login"] => Some(Self::Login),
            ["signup"] => Some(Self::Signup),
            ["logout"] => Some(Self::Logout),
            ["score_board"] => Some(Self::ScoreBoard),
            ["groups", group_name] => Some(Self::Group { group_name: (*group_name).to_owned() }),
            _ => None,
        }
    }

    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_owned(),
            Self::Login => "/login".to_owned(),
            Self::Signup => "/signup".to_owned(),
            Self::Logout => "/logout".to_owned(),
            Self::Group { group_name } => format!("/groups/{}", utf8_percent_encode(group_name, SEGMENT)),
            Self::ScoreBoard => "/score_board".to_owned(),
        }
    }

    /// Login and signup are reachable without a session.
    #[must_use]
    pub fn is_public(&self) -> bool {
        matches!(self, Self::Login | Self::Signup)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Outcome of a guarded navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Proceed(Route),
    Redirect(Route),
}

impl Navigation {
    /// The view that ends up displayed.
    #[must_use]
    pub fn destination(&self) -> &Route {
        match self {
            Self::Proceed(route) | Self::Redirect(route) => route,
        }
    }

    #[must_use]
    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect(_))
    }
}

/// Pure guard rule.
#[must_use]
pub fn guard(target: Route, authenticated: bool) -> Navigation {
    if target.is_public() || authenticated {
        Navigation::Proceed(target)
    } else {
        Navigation::Redirect(Route::Login)
    }
}

/// Guard bound to a session store.
#[derive(Debug, Clone, Copy)]
pub struct RouteGuard {
    /// Clear a present-but-unusable token when redirecting.
    pub erase_stale_token: bool,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self { erase_stale_token: true }
    }
}

impl RouteGuard {
    #[must_use]
    pub fn new(erase_stale_token: bool) -> Self {
        Self { erase_stale_token }
    }

    /// Evaluate the guard for `target` against `store`.
    ///
    /// Erasing a stale token is best effort: a storage failure is logged and
    /// the redirect still happens.
    pub fn before_each<S: TokenStorage>(&self, store: &mut SessionStore<S>, target: Route) -> Navigation {
        let navigation = guard(target, store.is_authenticated());
        if navigation.is_redirect() && self.erase_stale_token && store.token().is_some() {
            tracing::info!("erasing stale session token");
            if let Err(e) = store.clear_session() {
                tracing::warn!(error = %e, "failed to erase stale session token");
            }
        }
        navigation
    }
}
