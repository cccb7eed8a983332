//! HTTP Surface
//!
//! Synchronous request/response API for chat administration and setup.

pub mod handlers;
pub mod routes;
