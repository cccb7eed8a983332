//! Server membership entity and repository trait.
//!
//! Maps to the `server_members` table. At most one row per
//! (server, user) pair, enforced by a unique constraint.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Membership role within a chat server.
///
/// Database definition:
/// ```sql
/// CREATE TYPE member_role AS ENUM ('admin', 'user');
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    /// Can manage channels, members, invites, and pins
    Admin,
    /// Regular member
    #[default]
    User,
}

impl MemberRole {
    /// Convert from database string representation.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "admin" => Self::Admin,
            _ => Self::User,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }
}

impl std::fmt::Display for MemberRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ties a user to a ChatServer with a role and a join timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerMember {
    pub server_id: i64,
    pub user_id: i64,
    pub role: MemberRole,
    pub joined_at: DateTime<Utc>,
}

impl ServerMember {
    pub fn is_admin(&self) -> bool {
        self.role == MemberRole::Admin
    }
}

/// Repository trait for server membership data access.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// Find a membership row by server and user ID.
    async fn find(&self, server_id: i64, user_id: i64) -> Result<Option<ServerMember>, AppError>;

    /// All members of a server, oldest join first.
    async fn find_by_server(&self, server_id: i64) -> Result<Vec<ServerMember>, AppError>;

    /// Members with the admin role.
    async fn find_admins(&self, server_id: i64) -> Result<Vec<ServerMember>, AppError>;

    /// Insert a membership row; a duplicate (server, user) pair is a no-op.
    async fn upsert(&self, member: &ServerMember) -> Result<(), AppError>;

    /// Delete the user's server membership together with all of their
    /// channel-membership rows under that server, in one transaction.
    ///
    /// Used by leave and kick; partial deletion would strand channel
    /// memberships for a user who is no longer a member.
    async fn remove_with_channel_memberships(
        &self,
        server_id: i64,
        user_id: i64,
    ) -> Result<(), AppError>;

    /// Check if a user has a membership row for a server.
    async fn is_member(&self, server_id: i64, user_id: i64) -> Result<bool, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        assert_eq!(MemberRole::from_str("admin"), MemberRole::Admin);
        assert_eq!(MemberRole::from_str("user"), MemberRole::User);
        assert_eq!(MemberRole::from_str("something-else"), MemberRole::User);
        assert_eq!(MemberRole::Admin.as_str(), "admin");
    }
}
