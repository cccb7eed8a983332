//! ChatServer entity and repository trait.
//!
//! Maps to the `chat_servers` table. There is at most one server per
//! campaign; provisioning also writes the owning business's admin
//! membership row in the same transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Represents a per-campaign chat server.
///
/// Maps to the `chat_servers` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - campaign_id: BIGINT UNIQUE NOT NULL
/// - name: VARCHAR(100) NOT NULL
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatServer {
    /// Snowflake ID (primary key)
    pub id: i64,

    /// Owning campaign (one server per campaign)
    pub campaign_id: i64,

    /// Display name (mutable)
    pub name: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Repository trait for ChatServer data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ServerRepository: Send + Sync {
    /// Find a server by its Snowflake ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<ChatServer>, AppError>;

    /// Find the server provisioned for a campaign, if any.
    async fn find_by_campaign(&self, campaign_id: i64) -> Result<Option<ChatServer>, AppError>;

    /// Insert a server together with the owner's admin membership row.
    ///
    /// Both writes happen in one transaction so a provisioned server always
    /// has at least one explicit admin.
    async fn create_with_owner(
        &self,
        server: &ChatServer,
        owner_user_id: i64,
    ) -> Result<ChatServer, AppError>;

    /// Update the server's display name.
    async fn rename(&self, id: i64, name: &str) -> Result<ChatServer, AppError>;
}
