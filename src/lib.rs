//! # yak-client
//!
//! Client for the yak score-prediction game: REST wrapper for the `/api/v1`
//! namespace, a session store that persists its JWT between runs, and a
//! route guard that sends unauthenticated navigation back to login.
//!
//! The token check is a freshness check only; signatures are never verified
//! on the client.

pub mod config;
pub mod error;
pub mod jwt;
pub mod net;
pub mod router;
pub mod state;

#[cfg(test)]
mod test_support;

pub use error::ClientError;
