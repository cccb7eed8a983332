//! Invite Repository Implementation
//!
//! PostgreSQL implementation of the InviteRepository trait. `accept` is
//! the one genuinely multi-table transaction in the subsystem: invite
//! status, campaign participation, and server membership move together.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{InviteRepository, InviteStatus, ServerInvite};
use crate::shared::error::AppError;

/// Database row representation matching the server_invites table schema.
#[derive(Debug, sqlx::FromRow)]
struct InviteRow {
    id: i64,
    server_id: i64,
    invited_user_id: i64,
    invited_by: i64,
    status: String,
    responded_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl InviteRow {
    fn into_invite(self) -> ServerInvite {
        ServerInvite {
            id: self.id,
            server_id: self.server_id,
            invited_user_id: self.invited_user_id,
            invited_by: self.invited_by,
            status: InviteStatus::from_str(&self.status),
            responded_at: self.responded_at,
            created_at: self.created_at,
        }
    }
}

/// PostgreSQL invite repository implementation.
#[derive(Clone)]
pub struct PgInviteRepository {
    pool: PgPool,
}

impl PgInviteRepository {
    /// Create a new PgInviteRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InviteRepository for PgInviteRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<ServerInvite>, AppError> {
        let row = sqlx::query_as::<_, InviteRow>(
            r#"
            SELECT id, server_id, invited_user_id, invited_by,
                   status::text AS status, responded_at, created_at
            FROM server_invites
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_invite()))
    }

    async fn find_by_server(&self, server_id: i64) -> Result<Vec<ServerInvite>, AppError> {
        let rows = sqlx::query_as::<_, InviteRow>(
            r#"
            SELECT id, server_id, invited_user_id, invited_by,
                   status::text AS status, responded_at, created_at
            FROM server_invites
            WHERE server_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(server_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_invite()).collect())
    }

    async fn find_for_user(
        &self,
        server_id: i64,
        user_id: i64,
    ) -> Result<Option<ServerInvite>, AppError> {
        let row = sqlx::query_as::<_, InviteRow>(
            r#"
            SELECT id, server_id, invited_user_id, invited_by,
                   status::text AS status, responded_at, created_at
            FROM server_invites
            WHERE server_id = $1 AND invited_user_id = $2
            "#,
        )
        .bind(server_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_invite()))
    }

    async fn create(&self, invite: &ServerInvite) -> Result<ServerInvite, AppError> {
        let row = sqlx::query_as::<_, InviteRow>(
            r#"
            INSERT INTO server_invites (id, server_id, invited_user_id, invited_by, status)
            VALUES ($1, $2, $3, $4, 'pending')
            RETURNING id, server_id, invited_user_id, invited_by,
                      status::text AS status, responded_at, created_at
            "#,
        )
        .bind(invite.id)
        .bind(invite.server_id)
        .bind(invite.invited_user_id)
        .bind(invite.invited_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("User already has an invite for this server".to_string())
            }
            _ => AppError::Database(e),
        })?;

        Ok(row.into_invite())
    }

    async fn reset_to_pending(
        &self,
        id: i64,
        invited_by: i64,
    ) -> Result<ServerInvite, AppError> {
        let row = sqlx::query_as::<_, InviteRow>(
            r#"
            UPDATE server_invites
            SET status = 'pending', invited_by = $2, responded_at = NULL, created_at = NOW()
            WHERE id = $1
            RETURNING id, server_id, invited_user_id, invited_by,
                      status::text AS status, responded_at, created_at
            "#,
        )
        .bind(id)
        .bind(invited_by)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_invite())
            .ok_or_else(|| AppError::NotFound(format!("Invite {} not found", id)))
    }

    async fn decline(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE server_invites
            SET status = 'declined', responded_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Invite {} not found", id)));
        }

        Ok(())
    }

    /// All three writes share one transaction; an error on any of them
    /// drops the transaction without committing, so no partial state
    /// (accepted invite without membership, or the reverse) can persist.
    async fn accept(
        &self,
        invite_id: i64,
        server_id: i64,
        campaign_id: i64,
        user_id: i64,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE server_invites
            SET status = 'accepted', responded_at = NOW()
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(invite_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::BadRequest(
                "Invite is no longer pending".to_string(),
            ));
        }

        sqlx::query(
            r#"
            INSERT INTO campaign_participants (campaign_id, user_id, status)
            VALUES ($1, $2, 'approved')
            ON CONFLICT (campaign_id, user_id) DO UPDATE SET status = 'approved'
            "#,
        )
        .bind(campaign_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO server_members (server_id, user_id, role)
            VALUES ($1, $2, 'user')
            ON CONFLICT (server_id, user_id) DO NOTHING
            "#,
        )
        .bind(server_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }
}
