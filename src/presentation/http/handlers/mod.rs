//! HTTP Handlers
//!
//! Request handlers for all HTTP endpoints.

pub mod health;
pub mod server;
pub mod channel;
pub mod member;
pub mod invite;
