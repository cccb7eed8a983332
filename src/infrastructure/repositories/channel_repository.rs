//! Channel Repository Implementation
//!
//! PostgreSQL implementation of the ChannelRepository trait, covering
//! channels and their explicit membership rows.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Channel, ChannelMember, ChannelRepository, ChannelState};
use crate::shared::error::AppError;

/// Database row representation matching the channels table schema.
#[derive(Debug, sqlx::FromRow)]
struct ChannelRow {
    id: i64,
    server_id: i64,
    name: String,
    kind: String,
    description: Option<String>,
    state: String,
    created_at: DateTime<Utc>,
}

impl ChannelRow {
    fn into_channel(self) -> Channel {
        Channel {
            id: self.id,
            server_id: self.server_id,
            name: self.name,
            kind: self.kind,
            description: self.description,
            state: ChannelState::from_str(&self.state),
            created_at: self.created_at,
        }
    }
}

/// Database row representation matching the channel_members table schema.
#[derive(Debug, sqlx::FromRow)]
struct ChannelMemberRow {
    channel_id: i64,
    user_id: i64,
    added_by: i64,
    added_at: DateTime<Utc>,
}

impl ChannelMemberRow {
    fn into_member(self) -> ChannelMember {
        ChannelMember {
            channel_id: self.channel_id,
            user_id: self.user_id,
            added_by: self.added_by,
            added_at: self.added_at,
        }
    }
}

/// PostgreSQL channel repository implementation.
#[derive(Clone)]
pub struct PgChannelRepository {
    pool: PgPool,
}

impl PgChannelRepository {
    /// Create a new PgChannelRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChannelRepository for PgChannelRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Channel>, AppError> {
        let row = sqlx::query_as::<_, ChannelRow>(
            r#"
            SELECT id, server_id, name, kind, description, state::text AS state, created_at
            FROM channels
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_channel()))
    }

    async fn find_by_server(&self, server_id: i64) -> Result<Vec<Channel>, AppError> {
        let rows = sqlx::query_as::<_, ChannelRow>(
            r#"
            SELECT id, server_id, name, kind, description, state::text AS state, created_at
            FROM channels
            WHERE server_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(server_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_channel()).collect())
    }

    async fn create(&self, channel: &Channel) -> Result<Channel, AppError> {
        let row = sqlx::query_as::<_, ChannelRow>(
            r#"
            INSERT INTO channels (id, server_id, name, kind, description, state)
            VALUES ($1, $2, $3, $4, $5, $6::channel_state)
            RETURNING id, server_id, name, kind, description, state::text AS state, created_at
            "#,
        )
        .bind(channel.id)
        .bind(channel.server_id)
        .bind(&channel.name)
        .bind(&channel.kind)
        .bind(&channel.description)
        .bind(channel.state.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_channel())
    }

    async fn update(&self, channel: &Channel) -> Result<Channel, AppError> {
        let row = sqlx::query_as::<_, ChannelRow>(
            r#"
            UPDATE channels
            SET name = $2, description = $3, state = $4::channel_state
            WHERE id = $1
            RETURNING id, server_id, name, kind, description, state::text AS state, created_at
            "#,
        )
        .bind(channel.id)
        .bind(&channel.name)
        .bind(&channel.description)
        .bind(channel.state.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_channel())
            .ok_or_else(|| AppError::NotFound(format!("Channel {} not found", channel.id)))
    }

    /// Messages and channel_members rows go with the channel via
    /// ON DELETE CASCADE.
    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM channels WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Channel {} not found", id)));
        }

        Ok(())
    }

    async fn find_member(
        &self,
        channel_id: i64,
        user_id: i64,
    ) -> Result<Option<ChannelMember>, AppError> {
        let row = sqlx::query_as::<_, ChannelMemberRow>(
            r#"
            SELECT channel_id, user_id, added_by, added_at
            FROM channel_members
            WHERE channel_id = $1 AND user_id = $2
            "#,
        )
        .bind(channel_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_member()))
    }

    async fn find_members(&self, channel_id: i64) -> Result<Vec<ChannelMember>, AppError> {
        let rows = sqlx::query_as::<_, ChannelMemberRow>(
            r#"
            SELECT channel_id, user_id, added_by, added_at
            FROM channel_members
            WHERE channel_id = $1
            ORDER BY added_at ASC
            "#,
        )
        .bind(channel_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_member()).collect())
    }

    async fn add_member(&self, member: &ChannelMember) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO channel_members (channel_id, user_id, added_by, added_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (channel_id, user_id) DO NOTHING
            "#,
        )
        .bind(member.channel_id)
        .bind(member.user_id)
        .bind(member.added_by)
        .bind(member.added_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn is_member(&self, channel_id: i64, user_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM channel_members WHERE channel_id = $1 AND user_id = $2)",
        )
        .bind(channel_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(result)
    }
}
