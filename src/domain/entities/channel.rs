//! Channel and channel-membership entities with their repository trait.
//!
//! Maps to the `channels` and `channel_members` tables.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Channel visibility state matching the PostgreSQL ENUM `channel_state`.
///
/// Database definition:
/// ```sql
/// CREATE TYPE channel_state AS ENUM ('public', 'private');
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ChannelState {
    /// Visible to every server member
    #[default]
    Public,
    /// Visible only to server admins and explicit channel members
    Private,
}

impl ChannelState {
    /// Convert from database string representation.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "private" => Self::Private,
            _ => Self::Public,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }
}

impl std::fmt::Display for ChannelState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Represents a channel within a chat server.
///
/// Maps to the `channels` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - server_id: BIGINT REFERENCES chat_servers(id)
/// - name: VARCHAR(100) NOT NULL
/// - kind: VARCHAR(32) NOT NULL DEFAULT 'text' -- descriptive only
/// - description: TEXT NULL
/// - state: channel_state NOT NULL DEFAULT 'public'
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    /// Snowflake ID (primary key)
    pub id: i64,

    /// Owning server
    pub server_id: i64,

    /// Channel name (1-100 characters)
    pub name: String,

    /// Free-form type tag; never consulted for permissions
    pub kind: String,

    /// Free-text description
    pub description: Option<String>,

    /// Public/private visibility state
    pub state: ChannelState,

    /// Channel creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Channel {
    pub fn is_private(&self) -> bool {
        self.state == ChannelState::Private
    }
}

/// Ties a user to a private channel; records who added them and when.
///
/// Maps to the `channel_members` table. Unique per (channel, user).
/// Harmless on public channels but never required for visibility there.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelMember {
    pub channel_id: i64,
    pub user_id: i64,
    pub added_by: i64,
    pub added_at: DateTime<Utc>,
}

/// Repository trait for channel and channel-membership data access.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChannelRepository: Send + Sync {
    /// Find a channel by its Snowflake ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<Channel>, AppError>;

    /// All channels in a server, oldest first.
    async fn find_by_server(&self, server_id: i64) -> Result<Vec<Channel>, AppError>;

    /// Create a new channel.
    async fn create(&self, channel: &Channel) -> Result<Channel, AppError>;

    /// Update name/description/state.
    async fn update(&self, channel: &Channel) -> Result<Channel, AppError>;

    /// Hard delete; messages and channel memberships cascade at the store.
    async fn delete(&self, id: i64) -> Result<(), AppError>;

    /// Find a channel-membership row.
    async fn find_member(
        &self,
        channel_id: i64,
        user_id: i64,
    ) -> Result<Option<ChannelMember>, AppError>;

    /// All membership rows for a channel.
    async fn find_members(&self, channel_id: i64) -> Result<Vec<ChannelMember>, AppError>;

    /// Insert a channel-membership row; duplicates are a no-op.
    async fn add_member(&self, member: &ChannelMember) -> Result<(), AppError>;

    /// Check for an explicit channel-membership row.
    async fn is_member(&self, channel_id: i64, user_id: i64) -> Result<bool, AppError>;
}
