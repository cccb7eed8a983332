//! # Domain Layer
//!
//! The domain layer contains the core business logic of the chat core.
//! It is independent of any external frameworks or infrastructure concerns.
//!
//! ## Structure
//!
//! - **entities**: Core domain entities (ChatServer, Channel, ServerInvite, etc.)
//! - **services**: Pure domain services (visibility, presence)
//!
//! ## Design Principles
//!
//! - No dependencies on infrastructure or presentation layers
//! - Repository traits define data access contracts
//! - Authorization decisions are pure functions over fetched state

pub mod entities;
pub mod services;

// Re-export commonly used types
pub use entities::*;
