//! REST client for the `/api/v1` namespace.

pub mod api;
pub mod types;
