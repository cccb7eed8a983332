//! Read-only campaign facts consumed by authorization and eligibility.
//!
//! Campaign business rules live in the campaign domain service; this core
//! only asks who owns a campaign and who participates in it. The single
//! write against this domain (the approved-participant upsert during
//! invite acceptance) happens inside the invite repository's transaction.

use async_trait::async_trait;

use crate::shared::error::AppError;

/// Read-only lookup trait over the campaign collaborator's tables.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CampaignRepository: Send + Sync {
    /// The owning business's user id, or None for an unknown campaign.
    async fn owner_id(&self, campaign_id: i64) -> Result<Option<i64>, AppError>;

    /// True iff the user is an `approved` participant of the campaign.
    async fn is_approved_participant(
        &self,
        user_id: i64,
        campaign_id: i64,
    ) -> Result<bool, AppError>;

    /// User ids of all `approved` participants of the campaign.
    async fn approved_participant_ids(&self, campaign_id: i64) -> Result<Vec<i64>, AppError>;
}
