//! Channel Service
//!
//! Channel CRUD and the visibility-filtered listing. Channel creation can
//! provision members in the same call; member provisioning failures never
//! undo the channel itself.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::application::services::member_service::{BulkAddOutcome, MemberService};
use crate::domain::services::visibility;
use crate::domain::{
    CampaignRepository, Channel, ChannelRepository, ChannelState, MemberRepository,
    ServerRepository,
};
use crate::shared::error::AppError;
use crate::shared::snowflake::SnowflakeGenerator;

/// Create channel request.
#[derive(Debug, Clone, Default)]
pub struct CreateChannelDto {
    pub name: String,
    pub kind: Option<String>,
    pub description: Option<String>,
    pub state: Option<ChannelState>,
    pub member_user_ids: Vec<i64>,
}

/// Update channel request. Unset fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateChannelDto {
    pub name: Option<String>,
    pub description: Option<String>,
    pub state: Option<ChannelState>,
}

/// A freshly created channel plus the outcome of member provisioning.
#[derive(Debug, Clone)]
pub struct CreatedChannel {
    pub channel: Channel,
    pub members: BulkAddOutcome,
}

/// Channel operations. Admin gating happens at the call site through the
/// access service; eligibility rules for provisioned members come from
/// the member service.
#[async_trait]
pub trait ChannelService: Send + Sync {
    /// Create a channel, optionally provisioning members.
    async fn create_channel(
        &self,
        server_id: i64,
        actor_id: i64,
        request: CreateChannelDto,
    ) -> Result<CreatedChannel, AppError>;

    /// Update a channel under the given server.
    async fn update_channel(
        &self,
        server_id: i64,
        channel_id: i64,
        update: UpdateChannelDto,
    ) -> Result<Channel, AppError>;

    /// Hard-delete a channel; messages and memberships cascade away.
    async fn delete_channel(&self, server_id: i64, channel_id: i64) -> Result<(), AppError>;

    /// Channels the user may see. Admins and campaign owners get all;
    /// everyone else needs membership or approved participation, and
    /// private channels require an explicit channel-membership row.
    async fn list_visible(&self, server_id: i64, user_id: i64)
        -> Result<Vec<Channel>, AppError>;
}

/// ChannelService implementation.
pub struct ChannelServiceImpl<C, S, M, G, MS>
where
    C: ChannelRepository,
    S: ServerRepository,
    M: MemberRepository,
    G: CampaignRepository,
    MS: MemberService,
{
    channel_repo: Arc<C>,
    server_repo: Arc<S>,
    member_repo: Arc<M>,
    campaign_repo: Arc<G>,
    member_service: Arc<MS>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<C, S, M, G, MS> ChannelServiceImpl<C, S, M, G, MS>
where
    C: ChannelRepository,
    S: ServerRepository,
    M: MemberRepository,
    G: CampaignRepository,
    MS: MemberService,
{
    pub fn new(
        channel_repo: Arc<C>,
        server_repo: Arc<S>,
        member_repo: Arc<M>,
        campaign_repo: Arc<G>,
        member_service: Arc<MS>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            channel_repo,
            server_repo,
            member_repo,
            campaign_repo,
            member_service,
            id_generator,
        }
    }

    async fn channel_under_server(
        &self,
        server_id: i64,
        channel_id: i64,
    ) -> Result<Channel, AppError> {
        self.channel_repo
            .find_by_id(channel_id)
            .await?
            .filter(|c| c.server_id == server_id)
            .ok_or_else(|| AppError::NotFound("Channel not found".to_string()))
    }
}

#[async_trait]
impl<C, S, M, G, MS> ChannelService for ChannelServiceImpl<C, S, M, G, MS>
where
    C: ChannelRepository + 'static,
    S: ServerRepository + 'static,
    M: MemberRepository + 'static,
    G: CampaignRepository + 'static,
    MS: MemberService + 'static,
{
    async fn create_channel(
        &self,
        server_id: i64,
        actor_id: i64,
        request: CreateChannelDto,
    ) -> Result<CreatedChannel, AppError> {
        self.server_repo
            .find_by_id(server_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Server not found".to_string()))?;

        let channel = Channel {
            id: self.id_generator.generate(),
            server_id,
            name: request.name,
            // Descriptive only; never consulted for permissions.
            kind: request.kind.unwrap_or_else(|| "text".to_string()),
            description: request.description,
            state: request.state.unwrap_or_default(),
            created_at: Utc::now(),
        };
        let created = self.channel_repo.create(&channel).await?;

        let members = if request.member_user_ids.is_empty() {
            BulkAddOutcome::default()
        } else {
            self.member_service
                .add_members(server_id, created.id, &request.member_user_ids, actor_id)
                .await?
        };

        Ok(CreatedChannel {
            channel: created,
            members,
        })
    }

    async fn update_channel(
        &self,
        server_id: i64,
        channel_id: i64,
        update: UpdateChannelDto,
    ) -> Result<Channel, AppError> {
        let mut channel = self.channel_under_server(server_id, channel_id).await?;

        if let Some(name) = update.name {
            channel.name = name;
        }
        if let Some(description) = update.description {
            channel.description = Some(description);
        }
        if let Some(state) = update.state {
            channel.state = state;
        }

        self.channel_repo.update(&channel).await
    }

    async fn delete_channel(&self, server_id: i64, channel_id: i64) -> Result<(), AppError> {
        let channel = self.channel_under_server(server_id, channel_id).await?;
        self.channel_repo.delete(channel.id).await
    }

    async fn list_visible(
        &self,
        server_id: i64,
        user_id: i64,
    ) -> Result<Vec<Channel>, AppError> {
        let server = self
            .server_repo
            .find_by_id(server_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Server not found".to_string()))?;

        let membership = self.member_repo.find(server_id, user_id).await?;
        let is_owner = self.campaign_repo.owner_id(server.campaign_id).await? == Some(user_id);
        let channels = self.channel_repo.find_by_server(server_id).await?;

        if visibility::is_server_admin(membership.as_ref()) || is_owner {
            return Ok(channels);
        }

        let approved = self
            .campaign_repo
            .is_approved_participant(user_id, server.campaign_id)
            .await?;
        // Not found rather than forbidden, so outsiders cannot confirm
        // the server exists.
        if membership.is_none() && !approved {
            return Err(AppError::NotFound("Server not found".to_string()));
        }

        let mut visible = Vec::with_capacity(channels.len());
        for channel in channels {
            if channel.is_private() && !self.channel_repo.is_member(channel.id, user_id).await? {
                continue;
            }
            visible.push(channel);
        }
        Ok(visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::member_service::MockMemberService;
    use crate::domain::{
        ChatServer, MemberRole, MockCampaignRepository, MockChannelRepository,
        MockMemberRepository, MockServerRepository, ServerMember,
    };

    fn channel(id: i64, server_id: i64, state: ChannelState) -> Channel {
        Channel {
            id,
            server_id,
            name: format!("channel-{id}"),
            kind: "text".to_string(),
            description: None,
            state,
            created_at: Utc::now(),
        }
    }

    fn server_repo_with(campaign_id: i64) -> MockServerRepository {
        let mut repo = MockServerRepository::new();
        repo.expect_find_by_id().returning(move |id| {
            Ok(Some(ChatServer {
                id,
                campaign_id,
                name: "Campaign Chat".to_string(),
                created_at: Utc::now(),
            }))
        });
        repo
    }

    fn make_service(
        channel_repo: MockChannelRepository,
        server_repo: MockServerRepository,
        member_repo: MockMemberRepository,
        campaign_repo: MockCampaignRepository,
        member_service: MockMemberService,
    ) -> ChannelServiceImpl<
        MockChannelRepository,
        MockServerRepository,
        MockMemberRepository,
        MockCampaignRepository,
        MockMemberService,
    > {
        ChannelServiceImpl::new(
            Arc::new(channel_repo),
            Arc::new(server_repo),
            Arc::new(member_repo),
            Arc::new(campaign_repo),
            Arc::new(member_service),
            Arc::new(SnowflakeGenerator::new(1, 1)),
        )
    }

    #[tokio::test]
    async fn create_channel_keeps_channel_when_some_members_skipped() {
        let mut channel_repo = MockChannelRepository::new();
        channel_repo
            .expect_create()
            .returning(|c| Ok(c.clone()));
        let mut member_service = MockMemberService::new();
        member_service.expect_add_members().returning(|_, _, ids, _| {
            Ok(BulkAddOutcome {
                added: vec![ids[0]],
                skipped: ids[1..].to_vec(),
            })
        });

        let svc = make_service(
            channel_repo,
            server_repo_with(10),
            MockMemberRepository::new(),
            MockCampaignRepository::new(),
            member_service,
        );

        let created = svc
            .create_channel(
                1,
                99,
                CreateChannelDto {
                    name: "leads".to_string(),
                    state: Some(ChannelState::Private),
                    member_user_ids: vec![42, 43],
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(created.channel.state, ChannelState::Private);
        assert_eq!(created.members.added, vec![42]);
        assert_eq!(created.members.skipped, vec![43]);
    }

    #[tokio::test]
    async fn update_rejects_channel_under_other_server() {
        let mut channel_repo = MockChannelRepository::new();
        channel_repo
            .expect_find_by_id()
            .returning(|id| Ok(Some(channel(id, 2, ChannelState::Public))));

        let svc = make_service(
            channel_repo,
            MockServerRepository::new(),
            MockMemberRepository::new(),
            MockCampaignRepository::new(),
            MockMemberService::new(),
        );

        let err = svc
            .update_channel(1, 7, UpdateChannelDto::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_visible_returns_all_for_admin() {
        let mut channel_repo = MockChannelRepository::new();
        channel_repo.expect_find_by_server().returning(|s| {
            Ok(vec![
                channel(7, s, ChannelState::Public),
                channel(8, s, ChannelState::Private),
            ])
        });
        let mut member_repo = MockMemberRepository::new();
        member_repo.expect_find().returning(|s, u| {
            Ok(Some(ServerMember {
                server_id: s,
                user_id: u,
                role: MemberRole::Admin,
                joined_at: Utc::now(),
            }))
        });
        let mut campaign_repo = MockCampaignRepository::new();
        campaign_repo.expect_owner_id().returning(|_| Ok(Some(99)));

        let svc = make_service(
            channel_repo,
            server_repo_with(10),
            member_repo,
            campaign_repo,
            MockMemberService::new(),
        );

        let visible = svc.list_visible(1, 42).await.unwrap();
        assert_eq!(visible.len(), 2);
    }

    #[tokio::test]
    async fn list_visible_filters_private_channels_for_plain_member() {
        let mut channel_repo = MockChannelRepository::new();
        channel_repo.expect_find_by_server().returning(|s| {
            Ok(vec![
                channel(7, s, ChannelState::Public),
                channel(8, s, ChannelState::Private),
                channel(9, s, ChannelState::Private),
            ])
        });
        channel_repo
            .expect_is_member()
            .returning(|channel_id, _| Ok(channel_id == 9));
        let mut member_repo = MockMemberRepository::new();
        member_repo.expect_find().returning(|s, u| {
            Ok(Some(ServerMember {
                server_id: s,
                user_id: u,
                role: MemberRole::User,
                joined_at: Utc::now(),
            }))
        });
        let mut campaign_repo = MockCampaignRepository::new();
        campaign_repo.expect_owner_id().returning(|_| Ok(Some(99)));
        campaign_repo
            .expect_is_approved_participant()
            .returning(|_, _| Ok(true));

        let svc = make_service(
            channel_repo,
            server_repo_with(10),
            member_repo,
            campaign_repo,
            MockMemberService::new(),
        );

        let visible = svc.list_visible(1, 42).await.unwrap();
        let ids: Vec<i64> = visible.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![7, 9]);
    }

    #[tokio::test]
    async fn list_visible_masks_server_from_outsiders() {
        let mut channel_repo = MockChannelRepository::new();
        channel_repo
            .expect_find_by_server()
            .returning(|_| Ok(vec![]));
        let mut member_repo = MockMemberRepository::new();
        member_repo.expect_find().returning(|_, _| Ok(None));
        let mut campaign_repo = MockCampaignRepository::new();
        campaign_repo.expect_owner_id().returning(|_| Ok(Some(99)));
        campaign_repo
            .expect_is_approved_participant()
            .returning(|_, _| Ok(false));

        let svc = make_service(
            channel_repo,
            server_repo_with(10),
            member_repo,
            campaign_repo,
            MockMemberService::new(),
        );

        let err = svc.list_visible(1, 42).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
