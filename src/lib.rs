//! Campaign Chat
//!
//! Real-time chat backend for campaign collaboration. Each campaign gets a
//! chat server with public and private channels; creators join by admin
//! action or invite, and messages flow over a WebSocket gateway backed by
//! PostgreSQL.
//!
//! ## Architecture
//!
//! - `config`: Settings loaded from files and environment
//! - `domain`: Entities, repository traits, and authorization rules
//! - `application`: Services and DTOs
//! - `infrastructure`: PostgreSQL repositories and migrations
//! - `presentation`: HTTP handlers, WebSocket gateway, middleware
//! - `shared`: Errors, snowflake IDs, metrics

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
pub mod shared;
pub mod startup;
pub mod telemetry;
