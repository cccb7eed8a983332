//! User identity projection and profile lookup trait.
//!
//! User accounts and profiles are owned by the identity/profile
//! collaborator; this core only reads the minimal fields it needs for
//! eligibility checks and sender enrichment.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Account type carried on the bearer credential and the users table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    /// Content creator; the only type eligible for membership/invites
    Creator,
    /// Campaign-owning business
    Business,
    /// Platform administrator
    Admin,
}

impl UserType {
    /// Convert from database string representation.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "creator" => Some(Self::Creator),
            "business" => Some(Self::Business),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Creator => "creator",
            Self::Business => "business",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Minimal identity/display projection for a user.
///
/// `display_name` is the creator's "First Last" or the business's company
/// name; `avatar_url` the creator avatar or the business logo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: i64,
    pub email: String,
    pub user_type: UserType,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Read-only lookup trait over the identity/profile collaborator's tables.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Resolve a single user's profile projection.
    async fn find_profile(&self, user_id: i64) -> Result<Option<UserProfile>, AppError>;

    /// Resolve profiles for a batch of user ids; unknown ids are omitted.
    async fn find_profiles(&self, user_ids: &[i64]) -> Result<Vec<UserProfile>, AppError>;
}
