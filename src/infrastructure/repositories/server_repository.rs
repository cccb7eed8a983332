//! Server Repository Implementation
//!
//! PostgreSQL implementation of the ServerRepository trait. Provisioning
//! writes the server row and the owner's admin membership in one
//! transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{ChatServer, ServerRepository};
use crate::shared::error::AppError;

/// Database row representation matching the chat_servers table schema.
#[derive(Debug, sqlx::FromRow)]
struct ServerRow {
    id: i64,
    campaign_id: i64,
    name: String,
    created_at: DateTime<Utc>,
}

impl ServerRow {
    fn into_server(self) -> ChatServer {
        ChatServer {
            id: self.id,
            campaign_id: self.campaign_id,
            name: self.name,
            created_at: self.created_at,
        }
    }
}

/// PostgreSQL server repository implementation.
#[derive(Clone)]
pub struct PgServerRepository {
    pool: PgPool,
}

impl PgServerRepository {
    /// Create a new PgServerRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ServerRepository for PgServerRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<ChatServer>, AppError> {
        let row = sqlx::query_as::<_, ServerRow>(
            r#"
            SELECT id, campaign_id, name, created_at
            FROM chat_servers
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_server()))
    }

    async fn find_by_campaign(&self, campaign_id: i64) -> Result<Option<ChatServer>, AppError> {
        let row = sqlx::query_as::<_, ServerRow>(
            r#"
            SELECT id, campaign_id, name, created_at
            FROM chat_servers
            WHERE campaign_id = $1
            "#,
        )
        .bind(campaign_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_server()))
    }

    /// Insert the server and the owner's explicit admin membership.
    /// A second server for the same campaign maps to Conflict.
    async fn create_with_owner(
        &self,
        server: &ChatServer,
        owner_user_id: i64,
    ) -> Result<ChatServer, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ServerRow>(
            r#"
            INSERT INTO chat_servers (id, campaign_id, name)
            VALUES ($1, $2, $3)
            RETURNING id, campaign_id, name, created_at
            "#,
        )
        .bind(server.id)
        .bind(server.campaign_id)
        .bind(&server.name)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("Campaign already has a chat server".to_string())
            }
            _ => AppError::Database(e),
        })?;

        sqlx::query(
            r#"
            INSERT INTO server_members (server_id, user_id, role)
            VALUES ($1, $2, 'admin')
            ON CONFLICT (server_id, user_id) DO NOTHING
            "#,
        )
        .bind(server.id)
        .bind(owner_user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(row.into_server())
    }

    async fn rename(&self, id: i64, name: &str) -> Result<ChatServer, AppError> {
        let row = sqlx::query_as::<_, ServerRow>(
            r#"
            UPDATE chat_servers
            SET name = $2
            WHERE id = $1
            RETURNING id, campaign_id, name, created_at
            "#,
        )
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_server())
            .ok_or_else(|| AppError::NotFound(format!("Server {} not found", id)))
    }
}
