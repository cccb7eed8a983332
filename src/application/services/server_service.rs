//! Server Service
//!
//! Provisioning and administration of the per-campaign chat server.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::{CampaignRepository, ChatServer, ServerRepository};
use crate::shared::error::AppError;
use crate::shared::snowflake::SnowflakeGenerator;

/// Chat server lifecycle operations.
#[async_trait]
pub trait ServerService: Send + Sync {
    /// Provision the chat server for a campaign.
    ///
    /// Called by the campaign collaborator when a campaign is created.
    /// The campaign owner receives an explicit admin membership row in
    /// the same transaction, so every server starts with one admin and
    /// owner actions never depend on ownership special cases.
    async fn create_server(&self, campaign_id: i64, name: String)
        -> Result<ChatServer, AppError>;

    /// Rename a server. Authorization is the caller's responsibility.
    async fn rename_server(&self, server_id: i64, name: &str) -> Result<ChatServer, AppError>;

    /// Look up the server provisioned for a campaign.
    async fn find_by_campaign(&self, campaign_id: i64) -> Result<Option<ChatServer>, AppError>;
}

/// ServerService implementation.
pub struct ServerServiceImpl<S, G>
where
    S: ServerRepository,
    G: CampaignRepository,
{
    server_repo: Arc<S>,
    campaign_repo: Arc<G>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<S, G> ServerServiceImpl<S, G>
where
    S: ServerRepository,
    G: CampaignRepository,
{
    pub fn new(
        server_repo: Arc<S>,
        campaign_repo: Arc<G>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            server_repo,
            campaign_repo,
            id_generator,
        }
    }
}

#[async_trait]
impl<S, G> ServerService for ServerServiceImpl<S, G>
where
    S: ServerRepository + 'static,
    G: CampaignRepository + 'static,
{
    async fn create_server(
        &self,
        campaign_id: i64,
        name: String,
    ) -> Result<ChatServer, AppError> {
        let owner_id = self
            .campaign_repo
            .owner_id(campaign_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Campaign not found".to_string()))?;

        let server = ChatServer {
            id: self.id_generator.generate(),
            campaign_id,
            name,
            created_at: Utc::now(),
        };

        self.server_repo.create_with_owner(&server, owner_id).await
    }

    async fn rename_server(&self, server_id: i64, name: &str) -> Result<ChatServer, AppError> {
        self.server_repo.rename(server_id, name).await
    }

    async fn find_by_campaign(&self, campaign_id: i64) -> Result<Option<ChatServer>, AppError> {
        self.server_repo.find_by_campaign(campaign_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MockCampaignRepository, MockServerRepository};

    #[tokio::test]
    async fn create_server_fails_for_unknown_campaign() {
        let server_repo = MockServerRepository::new();
        let mut campaign_repo = MockCampaignRepository::new();
        campaign_repo.expect_owner_id().returning(|_| Ok(None));

        let svc = ServerServiceImpl::new(
            Arc::new(server_repo),
            Arc::new(campaign_repo),
            Arc::new(SnowflakeGenerator::new(1, 1)),
        );

        let err = svc
            .create_server(5, "Campaign Chat".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn create_server_writes_owner_admin_row() {
        let mut server_repo = MockServerRepository::new();
        server_repo
            .expect_create_with_owner()
            .withf(|server, owner_id| server.campaign_id == 5 && *owner_id == 77)
            .returning(|server, _| Ok(server.clone()));
        let mut campaign_repo = MockCampaignRepository::new();
        campaign_repo.expect_owner_id().returning(|_| Ok(Some(77)));

        let svc = ServerServiceImpl::new(
            Arc::new(server_repo),
            Arc::new(campaign_repo),
            Arc::new(SnowflakeGenerator::new(1, 1)),
        );

        let server = svc
            .create_server(5, "Campaign Chat".to_string())
            .await
            .unwrap();
        assert_eq!(server.campaign_id, 5);
    }
}
