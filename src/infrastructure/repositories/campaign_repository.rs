//! Campaign Facts Repository Implementation
//!
//! Read-only lookups against the campaign collaborator's tables.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::CampaignRepository;
use crate::shared::error::AppError;

/// PostgreSQL campaign facts repository implementation.
#[derive(Clone)]
pub struct PgCampaignRepository {
    pool: PgPool,
}

impl PgCampaignRepository {
    /// Create a new PgCampaignRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CampaignRepository for PgCampaignRepository {
    async fn owner_id(&self, campaign_id: i64) -> Result<Option<i64>, AppError> {
        let owner = sqlx::query_scalar::<_, i64>(
            "SELECT business_id FROM campaigns WHERE id = $1",
        )
        .bind(campaign_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(owner)
    }

    async fn is_approved_participant(
        &self,
        user_id: i64,
        campaign_id: i64,
    ) -> Result<bool, AppError> {
        let result = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM campaign_participants
                WHERE campaign_id = $1 AND user_id = $2 AND status = 'approved'
            )
            "#,
        )
        .bind(campaign_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(result)
    }

    async fn approved_participant_ids(&self, campaign_id: i64) -> Result<Vec<i64>, AppError> {
        let ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT user_id FROM campaign_participants
            WHERE campaign_id = $1 AND status = 'approved'
            ORDER BY user_id ASC
            "#,
        )
        .bind(campaign_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }
}
