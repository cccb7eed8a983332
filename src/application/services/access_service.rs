//! Access Service
//!
//! Single enforcement point for server and channel visibility. Both the
//! HTTP handlers and the websocket gateway route authorization through
//! this service so the two surfaces cannot drift apart.
//!
//! Reads answer two different questions and the distinction matters:
//! view access accepts a membership row or campaign ownership, while
//! admin actions require an explicit `admin` membership row. Ownership
//! alone never grants admin actions.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::services::visibility;
use crate::domain::{
    CampaignRepository, Channel, ChannelRepository, ChatServer, MemberRepository,
    ServerRepository,
};
use crate::shared::error::AppError;

/// Authorization decisions over servers and channels.
#[async_trait]
pub trait AccessService: Send + Sync {
    /// Resolve a server the user may view.
    ///
    /// A server the user cannot view is reported as not found, the same
    /// as a server that does not exist, so probing ids reveals nothing.
    async fn view_server(&self, server_id: i64, user_id: i64) -> Result<ChatServer, AppError>;

    /// Resolve a channel the user may view, with the same masking rule.
    async fn view_channel(&self, channel_id: i64, user_id: i64) -> Result<Channel, AppError>;

    /// Resolve a server for an admin action by the user.
    ///
    /// Not found if the server is missing or hidden from the user,
    /// forbidden if the user can view it but holds no admin row.
    async fn admin_server(&self, server_id: i64, user_id: i64) -> Result<ChatServer, AppError>;

    /// Whether the user holds an explicit admin membership row.
    async fn is_admin(&self, server_id: i64, user_id: i64) -> Result<bool, AppError>;
}

/// AccessService implementation backed by the persistence repositories.
pub struct AccessServiceImpl<S, M, C, G>
where
    S: ServerRepository,
    M: MemberRepository,
    C: ChannelRepository,
    G: CampaignRepository,
{
    server_repo: Arc<S>,
    member_repo: Arc<M>,
    channel_repo: Arc<C>,
    campaign_repo: Arc<G>,
}

impl<S, M, C, G> AccessServiceImpl<S, M, C, G>
where
    S: ServerRepository,
    M: MemberRepository,
    C: ChannelRepository,
    G: CampaignRepository,
{
    pub fn new(
        server_repo: Arc<S>,
        member_repo: Arc<M>,
        channel_repo: Arc<C>,
        campaign_repo: Arc<G>,
    ) -> Self {
        Self {
            server_repo,
            member_repo,
            channel_repo,
            campaign_repo,
        }
    }

    async fn is_campaign_owner(&self, campaign_id: i64, user_id: i64) -> Result<bool, AppError> {
        let owner = self.campaign_repo.owner_id(campaign_id).await?;
        Ok(owner == Some(user_id))
    }
}

#[async_trait]
impl<S, M, C, G> AccessService for AccessServiceImpl<S, M, C, G>
where
    S: ServerRepository + 'static,
    M: MemberRepository + 'static,
    C: ChannelRepository + 'static,
    G: CampaignRepository + 'static,
{
    async fn view_server(&self, server_id: i64, user_id: i64) -> Result<ChatServer, AppError> {
        let server = self
            .server_repo
            .find_by_id(server_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Server not found".to_string()))?;

        let membership = self.member_repo.find(server_id, user_id).await?;
        let is_owner = self.is_campaign_owner(server.campaign_id, user_id).await?;

        if visibility::can_view_server(membership.as_ref(), is_owner) {
            Ok(server)
        } else {
            Err(AppError::NotFound("Server not found".to_string()))
        }
    }

    async fn view_channel(&self, channel_id: i64, user_id: i64) -> Result<Channel, AppError> {
        let channel = self
            .channel_repo
            .find_by_id(channel_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Channel not found".to_string()))?;

        let membership = self.member_repo.find(channel.server_id, user_id).await?;
        let server = self
            .server_repo
            .find_by_id(channel.server_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Channel not found".to_string()))?;
        let is_owner = self.is_campaign_owner(server.campaign_id, user_id).await?;

        let has_channel_membership = if channel.is_private() {
            self.channel_repo.is_member(channel_id, user_id).await?
        } else {
            false
        };

        if visibility::can_view_channel(
            membership.as_ref(),
            is_owner,
            channel.state,
            has_channel_membership,
        ) {
            Ok(channel)
        } else {
            Err(AppError::NotFound("Channel not found".to_string()))
        }
    }

    async fn admin_server(&self, server_id: i64, user_id: i64) -> Result<ChatServer, AppError> {
        let server = self.view_server(server_id, user_id).await?;
        let membership = self.member_repo.find(server_id, user_id).await?;

        if visibility::is_server_admin(membership.as_ref()) {
            Ok(server)
        } else {
            Err(AppError::Forbidden(
                "Admin membership required".to_string(),
            ))
        }
    }

    async fn is_admin(&self, server_id: i64, user_id: i64) -> Result<bool, AppError> {
        let membership = self.member_repo.find(server_id, user_id).await?;
        Ok(visibility::is_server_admin(membership.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        ChannelState, ChatServer, MemberRole, MockCampaignRepository, MockChannelRepository,
        MockMemberRepository, MockServerRepository, ServerMember,
    };
    use chrono::Utc;

    fn server(id: i64, campaign_id: i64) -> ChatServer {
        ChatServer {
            id,
            campaign_id,
            name: "Campaign Chat".to_string(),
            created_at: Utc::now(),
        }
    }

    fn member(server_id: i64, user_id: i64, role: MemberRole) -> ServerMember {
        ServerMember {
            server_id,
            user_id,
            role,
            joined_at: Utc::now(),
        }
    }

    fn service(
        server_repo: MockServerRepository,
        member_repo: MockMemberRepository,
        channel_repo: MockChannelRepository,
        campaign_repo: MockCampaignRepository,
    ) -> AccessServiceImpl<
        MockServerRepository,
        MockMemberRepository,
        MockChannelRepository,
        MockCampaignRepository,
    > {
        AccessServiceImpl::new(
            Arc::new(server_repo),
            Arc::new(member_repo),
            Arc::new(channel_repo),
            Arc::new(campaign_repo),
        )
    }

    #[tokio::test]
    async fn view_server_masks_hidden_server_as_not_found() {
        let mut server_repo = MockServerRepository::new();
        server_repo
            .expect_find_by_id()
            .returning(|_| Ok(Some(server(1, 10))));
        let mut member_repo = MockMemberRepository::new();
        member_repo.expect_find().returning(|_, _| Ok(None));
        let mut campaign_repo = MockCampaignRepository::new();
        campaign_repo.expect_owner_id().returning(|_| Ok(Some(99)));

        let svc = service(
            server_repo,
            member_repo,
            MockChannelRepository::new(),
            campaign_repo,
        );

        let err = svc.view_server(1, 42).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn view_server_accepts_campaign_owner_without_membership() {
        let mut server_repo = MockServerRepository::new();
        server_repo
            .expect_find_by_id()
            .returning(|_| Ok(Some(server(1, 10))));
        let mut member_repo = MockMemberRepository::new();
        member_repo.expect_find().returning(|_, _| Ok(None));
        let mut campaign_repo = MockCampaignRepository::new();
        campaign_repo.expect_owner_id().returning(|_| Ok(Some(42)));

        let svc = service(
            server_repo,
            member_repo,
            MockChannelRepository::new(),
            campaign_repo,
        );

        let found = svc.view_server(1, 42).await.unwrap();
        assert_eq!(found.id, 1);
    }

    #[tokio::test]
    async fn admin_server_rejects_owner_without_admin_row() {
        let mut server_repo = MockServerRepository::new();
        server_repo
            .expect_find_by_id()
            .returning(|_| Ok(Some(server(1, 10))));
        let mut member_repo = MockMemberRepository::new();
        member_repo.expect_find().returning(|_, _| Ok(None));
        let mut campaign_repo = MockCampaignRepository::new();
        campaign_repo.expect_owner_id().returning(|_| Ok(Some(42)));

        let svc = service(
            server_repo,
            member_repo,
            MockChannelRepository::new(),
            campaign_repo,
        );

        let err = svc.admin_server(1, 42).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn admin_server_accepts_explicit_admin_row() {
        let mut server_repo = MockServerRepository::new();
        server_repo
            .expect_find_by_id()
            .returning(|_| Ok(Some(server(1, 10))));
        let mut member_repo = MockMemberRepository::new();
        member_repo
            .expect_find()
            .returning(|_, _| Ok(Some(member(1, 42, MemberRole::Admin))));
        let mut campaign_repo = MockCampaignRepository::new();
        campaign_repo.expect_owner_id().returning(|_| Ok(Some(99)));

        let svc = service(
            server_repo,
            member_repo,
            MockChannelRepository::new(),
            campaign_repo,
        );

        assert!(svc.admin_server(1, 42).await.is_ok());
    }

    #[tokio::test]
    async fn view_channel_hides_private_channel_from_plain_member() {
        let mut server_repo = MockServerRepository::new();
        server_repo
            .expect_find_by_id()
            .returning(|_| Ok(Some(server(1, 10))));
        let mut member_repo = MockMemberRepository::new();
        member_repo
            .expect_find()
            .returning(|_, _| Ok(Some(member(1, 42, MemberRole::User))));
        let mut channel_repo = MockChannelRepository::new();
        channel_repo.expect_find_by_id().returning(|id| {
            Ok(Some(crate::domain::Channel {
                id,
                server_id: 1,
                name: "leads".to_string(),
                kind: "text".to_string(),
                description: None,
                state: ChannelState::Private,
                created_at: Utc::now(),
            }))
        });
        channel_repo.expect_is_member().returning(|_, _| Ok(false));
        let mut campaign_repo = MockCampaignRepository::new();
        campaign_repo.expect_owner_id().returning(|_| Ok(Some(99)));

        let svc = service(server_repo, member_repo, channel_repo, campaign_repo);

        let err = svc.view_channel(7, 42).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
