//! Client-side session state.
//!
//! DESIGN
//! ======
//! `session` holds the in-memory model and the actions that change it;
//! `storage` is the durable mirror behind the [`storage::TokenStorage`] seam.

pub mod session;
pub mod storage;
