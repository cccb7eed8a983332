//! Server invite entity and repository trait.
//!
//! Maps to the `server_invites` table. At most one row per
//! (server, invited user); re-inviting a declined user resets the same row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Invite lifecycle state matching the PostgreSQL ENUM `invite_status`.
///
/// Database definition:
/// ```sql
/// CREATE TYPE invite_status AS ENUM ('pending', 'accepted', 'declined');
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InviteStatus {
    #[default]
    Pending,
    Accepted,
    Declined,
}

impl InviteStatus {
    /// Convert from database string representation.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "accepted" => Self::Accepted,
            "declined" => Self::Declined,
            _ => Self::Pending,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
        }
    }
}

impl std::fmt::Display for InviteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An invitation for a creator to join a ChatServer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInvite {
    /// Snowflake ID (primary key)
    pub id: i64,
    pub server_id: i64,
    pub invited_user_id: i64,
    pub invited_by: i64,
    pub status: InviteStatus,
    /// Set when the invite is accepted or declined
    pub responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ServerInvite {
    pub fn is_pending(&self) -> bool {
        self.status == InviteStatus::Pending
    }
}

/// Repository trait for server invite data access.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InviteRepository: Send + Sync {
    /// Find an invite by its Snowflake ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<ServerInvite>, AppError>;

    /// All invites for a server, newest first.
    async fn find_by_server(&self, server_id: i64) -> Result<Vec<ServerInvite>, AppError>;

    /// The unique invite row for (server, user), in any status.
    async fn find_for_user(
        &self,
        server_id: i64,
        user_id: i64,
    ) -> Result<Option<ServerInvite>, AppError>;

    /// Insert a new pending invite.
    async fn create(&self, invite: &ServerInvite) -> Result<ServerInvite, AppError>;

    /// Reset a declined invite back to pending under a new inviter.
    async fn reset_to_pending(&self, id: i64, invited_by: i64)
        -> Result<ServerInvite, AppError>;

    /// Mark an invite declined with a response timestamp.
    async fn decline(&self, id: i64) -> Result<(), AppError>;

    /// Accept an invite atomically: mark it accepted, upsert the approved
    /// campaign-participant row, and upsert the `user`-role server
    /// membership. All three writes share one transaction; if any fails,
    /// none persist.
    async fn accept(
        &self,
        invite_id: i64,
        server_id: i64,
        campaign_id: i64,
        user_id: i64,
    ) -> Result<(), AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        assert_eq!(InviteStatus::from_str("pending"), InviteStatus::Pending);
        assert_eq!(InviteStatus::from_str("accepted"), InviteStatus::Accepted);
        assert_eq!(InviteStatus::from_str("declined"), InviteStatus::Declined);
        assert_eq!(InviteStatus::from_str("garbage"), InviteStatus::Pending);
        assert_eq!(InviteStatus::Declined.as_str(), "declined");
    }
}
