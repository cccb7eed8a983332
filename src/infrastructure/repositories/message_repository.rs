//! Message Repository Implementation
//!
//! PostgreSQL implementation of message operations. The BIGSERIAL id is
//! the only sort/cursor key; keyset pagination on `id < before` keeps
//! history pages contiguous under concurrent inserts.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{ChannelMessage, MessageRepository};
use crate::shared::error::AppError;

/// Internal row type for message queries.
#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: i64,
    channel_id: i64,
    sender_id: i64,
    content: String,
    pinned: bool,
    created_at: DateTime<Utc>,
}

impl MessageRow {
    fn into_message(self) -> ChannelMessage {
        ChannelMessage {
            id: self.id,
            channel_id: self.channel_id,
            sender_id: self.sender_id,
            content: self.content,
            pinned: self.pinned,
            created_at: self.created_at,
        }
    }
}

/// PostgreSQL message repository implementation.
#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    /// Creates a new PgMessageRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    async fn insert(
        &self,
        channel_id: i64,
        sender_id: i64,
        content: &str,
    ) -> Result<ChannelMessage, AppError> {
        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            INSERT INTO channel_messages (channel_id, sender_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, channel_id, sender_id, content, pinned, created_at
            "#,
        )
        .bind(channel_id)
        .bind(sender_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_message())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ChannelMessage>, AppError> {
        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, channel_id, sender_id, content, pinned, created_at
            FROM channel_messages
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_message()))
    }

    async fn find_page(
        &self,
        channel_id: i64,
        before: Option<i64>,
        limit: i64,
    ) -> Result<Vec<ChannelMessage>, AppError> {
        let rows = if let Some(before_id) = before {
            sqlx::query_as::<_, MessageRow>(
                r#"
                SELECT id, channel_id, sender_id, content, pinned, created_at
                FROM channel_messages
                WHERE channel_id = $1 AND id < $2
                ORDER BY id DESC
                LIMIT $3
                "#,
            )
            .bind(channel_id)
            .bind(before_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, MessageRow>(
                r#"
                SELECT id, channel_id, sender_id, content, pinned, created_at
                FROM channel_messages
                WHERE channel_id = $1
                ORDER BY id DESC
                LIMIT $2
                "#,
            )
            .bind(channel_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?
        };

        Ok(rows.into_iter().map(|r| r.into_message()).collect())
    }

    async fn set_pinned(&self, id: i64, pinned: bool) -> Result<ChannelMessage, AppError> {
        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            UPDATE channel_messages
            SET pinned = $2
            WHERE id = $1
            RETURNING id, channel_id, sender_id, content, pinned, created_at
            "#,
        )
        .bind(id)
        .bind(pinned)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_message())
            .ok_or_else(|| AppError::NotFound(format!("Message {} not found", id)))
    }
}
