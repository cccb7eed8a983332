//! Member Repository Implementation
//!
//! PostgreSQL implementation of the MemberRepository trait. Handles server
//! membership rows and the leave/kick deletion transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{MemberRepository, MemberRole, ServerMember};
use crate::shared::error::AppError;

/// Database row representation matching the server_members table schema.
#[derive(Debug, sqlx::FromRow)]
struct MemberRow {
    server_id: i64,
    user_id: i64,
    role: String,
    joined_at: DateTime<Utc>,
}

impl MemberRow {
    fn into_member(self) -> ServerMember {
        ServerMember {
            server_id: self.server_id,
            user_id: self.user_id,
            role: MemberRole::from_str(&self.role),
            joined_at: self.joined_at,
        }
    }
}

/// PostgreSQL member repository implementation.
#[derive(Clone)]
pub struct PgMemberRepository {
    pool: PgPool,
}

impl PgMemberRepository {
    /// Create a new PgMemberRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberRepository for PgMemberRepository {
    async fn find(&self, server_id: i64, user_id: i64) -> Result<Option<ServerMember>, AppError> {
        let row = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT server_id, user_id, role::text AS role, joined_at
            FROM server_members
            WHERE server_id = $1 AND user_id = $2
            "#,
        )
        .bind(server_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_member()))
    }

    async fn find_by_server(&self, server_id: i64) -> Result<Vec<ServerMember>, AppError> {
        let rows = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT server_id, user_id, role::text AS role, joined_at
            FROM server_members
            WHERE server_id = $1
            ORDER BY joined_at ASC
            "#,
        )
        .bind(server_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_member()).collect())
    }

    async fn find_admins(&self, server_id: i64) -> Result<Vec<ServerMember>, AppError> {
        let rows = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT server_id, user_id, role::text AS role, joined_at
            FROM server_members
            WHERE server_id = $1 AND role = 'admin'
            ORDER BY joined_at ASC
            "#,
        )
        .bind(server_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_member()).collect())
    }

    /// The unique constraint makes concurrent duplicate adds race-safe:
    /// whichever insert loses the race becomes a no-op.
    async fn upsert(&self, member: &ServerMember) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO server_members (server_id, user_id, role, joined_at)
            VALUES ($1, $2, $3::member_role, $4)
            ON CONFLICT (server_id, user_id) DO NOTHING
            "#,
        )
        .bind(member.server_id)
        .bind(member.user_id)
        .bind(member.role.as_str())
        .bind(member.joined_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove_with_channel_memberships(
        &self,
        server_id: i64,
        user_id: i64,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            DELETE FROM channel_members
            WHERE user_id = $2
              AND channel_id IN (SELECT id FROM channels WHERE server_id = $1)
            "#,
        )
        .bind(server_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query(
            "DELETE FROM server_members WHERE server_id = $1 AND user_id = $2",
        )
        .bind(server_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Member not found in server {} for user {}",
                server_id, user_id
            )));
        }

        tx.commit().await?;

        Ok(())
    }

    async fn is_member(&self, server_id: i64, user_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM server_members WHERE server_id = $1 AND user_id = $2)",
        )
        .bind(server_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(result)
    }
}
