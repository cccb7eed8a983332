//! Channel message entity and repository trait.
//!
//! Maps to the `channel_messages` table. Messages are immutable except for
//! the pin flag, and are ordered by a BIGSERIAL id that doubles as the
//! pagination cursor. `created_at` is not unique and is never used as a
//! sort or cursor key.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// A text message sent in a channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelMessage {
    /// Auto-incrementing identifier; strictly increasing per insert
    pub id: i64,
    pub channel_id: i64,
    pub sender_id: i64,
    pub content: String,
    /// The only mutable field
    pub pinned: bool,
    pub created_at: DateTime<Utc>,
}

/// Repository trait for channel message data access.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Insert a message; the id is assigned by the database sequence.
    async fn insert(
        &self,
        channel_id: i64,
        sender_id: i64,
        content: &str,
    ) -> Result<ChannelMessage, AppError>;

    /// Find a message by its ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<ChannelMessage>, AppError>;

    /// Fetch a history page in descending-id order, bounded by `before`
    /// (exclusive) when given.
    async fn find_page(
        &self,
        channel_id: i64,
        before: Option<i64>,
        limit: i64,
    ) -> Result<Vec<ChannelMessage>, AppError>;

    /// Update the pin flag, returning the updated row.
    async fn set_pinned(&self, id: i64, pinned: bool) -> Result<ChannelMessage, AppError>;
}
