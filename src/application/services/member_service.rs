//! Member Service
//!
//! Channel membership provisioning and server membership lifecycle.
//! Eligibility rules live here: only creator-type users who are approved
//! participants of the server's campaign can be added to channels.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::services::visibility;
use crate::domain::{
    CampaignRepository, Channel, ChannelMember, ChannelRepository, MemberRepository, MemberRole,
    ProfileRepository, ServerRepository, UserProfile, UserType,
};
use crate::shared::error::AppError;

/// Outcome of a bulk channel-member add.
///
/// Skipped ids carry no reason on purpose: callers only learn who made it
/// in and who did not.
#[derive(Debug, Clone, Default)]
pub struct BulkAddOutcome {
    pub added: Vec<i64>,
    pub skipped: Vec<i64>,
}

/// A membership row joined with the user's display identity.
#[derive(Debug, Clone)]
pub struct MemberView {
    pub user_id: i64,
    pub email: String,
    pub user_type: UserType,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Option<MemberRole>,
    pub joined_at: DateTime<Utc>,
}

/// Membership operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MemberService: Send + Sync {
    /// Add one creator to a channel. Idempotent for existing members.
    async fn add_member(
        &self,
        server_id: i64,
        channel_id: i64,
        creator_user_id: i64,
        added_by: i64,
    ) -> Result<(), AppError>;

    /// Bulk add; ineligible ids are skipped, never failing the batch.
    async fn add_members(
        &self,
        server_id: i64,
        channel_id: i64,
        creator_user_ids: &[i64],
        added_by: i64,
    ) -> Result<BulkAddOutcome, AppError>;

    /// All membership rows for a server, joined with display identities.
    async fn list_server_members(&self, server_id: i64) -> Result<Vec<MemberView>, AppError>;

    /// Users of a channel. Public channels expose every server member;
    /// private channels union explicit channel members with server admins,
    /// deduplicated by user id with the channel join timestamp winning.
    async fn list_channel_users(
        &self,
        server_id: i64,
        channel_id: i64,
    ) -> Result<Vec<MemberView>, AppError>;

    /// Remove the caller's own membership. Admins cannot leave.
    async fn leave_server(&self, server_id: i64, user_id: i64) -> Result<(), AppError>;

    /// Remove another member. The actor needs an admin row; admins
    /// cannot be kicked.
    async fn kick_member(
        &self,
        server_id: i64,
        actor_id: i64,
        target_user_id: i64,
    ) -> Result<(), AppError>;
}

/// MemberService implementation.
pub struct MemberServiceImpl<C, S, M, G, P>
where
    C: ChannelRepository,
    S: ServerRepository,
    M: MemberRepository,
    G: CampaignRepository,
    P: ProfileRepository,
{
    channel_repo: Arc<C>,
    server_repo: Arc<S>,
    member_repo: Arc<M>,
    campaign_repo: Arc<G>,
    profile_repo: Arc<P>,
}

impl<C, S, M, G, P> MemberServiceImpl<C, S, M, G, P>
where
    C: ChannelRepository,
    S: ServerRepository,
    M: MemberRepository,
    G: CampaignRepository,
    P: ProfileRepository,
{
    pub fn new(
        channel_repo: Arc<C>,
        server_repo: Arc<S>,
        member_repo: Arc<M>,
        campaign_repo: Arc<G>,
        profile_repo: Arc<P>,
    ) -> Self {
        Self {
            channel_repo,
            server_repo,
            member_repo,
            campaign_repo,
            profile_repo,
        }
    }

    /// Resolve a channel and assert it belongs to the stated server.
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

    /// Eligibility for channel membership: creator type and approved
    /// campaign participation.
    async fn check_eligible(
        &self,
        campaign_id: i64,
        user_id: i64,
    ) -> Result<(), AppError> {
        let profile = self
            .profile_repo
            .find_profile(user_id)
            .await?
            .ok_or_else(|| AppError::BadRequest("Target user not found".to_string()))?;
        if profile.user_type != UserType::Creator {
            return Err(AppError::BadRequest(
                "Target user must be a creator".to_string(),
            ));
        }
        if !self
            .campaign_repo
            .is_approved_participant(user_id, campaign_id)
            .await?
        {
            return Err(AppError::BadRequest(
                "Target user must be an approved participant".to_string(),
            ));
        }
        Ok(())
    }

    fn view_from(profile: &UserProfile, role: Option<MemberRole>, joined_at: DateTime<Utc>) -> MemberView {
        MemberView {
            user_id: profile.user_id,
            email: profile.email.clone(),
            user_type: profile.user_type,
            display_name: profile.display_name.clone(),
            avatar_url: profile.avatar_url.clone(),
            role,
            joined_at,
        }
    }
}

#[async_trait]
impl<C, S, M, G, P> MemberService for MemberServiceImpl<C, S, M, G, P>
where
    C: ChannelRepository + 'static,
    S: ServerRepository + 'static,
    M: MemberRepository + 'static,
    G: CampaignRepository + 'static,
    P: ProfileRepository + 'static,
{
    async fn add_member(
        &self,
        server_id: i64,
        channel_id: i64,
        creator_user_id: i64,
        added_by: i64,
    ) -> Result<(), AppError> {
        let channel = self.channel_under_server(server_id, channel_id).await?;
        let server = self
            .server_repo
            .find_by_id(channel.server_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Server not found".to_string()))?;

        self.check_eligible(server.campaign_id, creator_user_id).await?;

        if self.channel_repo.is_member(channel_id, creator_user_id).await? {
            return Ok(());
        }

        self.channel_repo
            .add_member(&ChannelMember {
                channel_id,
                user_id: creator_user_id,
                added_by,
                added_at: Utc::now(),
            })
            .await
    }

    async fn add_members(
        &self,
        server_id: i64,
        channel_id: i64,
        creator_user_ids: &[i64],
        added_by: i64,
    ) -> Result<BulkAddOutcome, AppError> {
        let channel = self.channel_under_server(server_id, channel_id).await?;
        let server = self
            .server_repo
            .find_by_id(channel.server_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Server not found".to_string()))?;

        let mut outcome = BulkAddOutcome::default();
        for &user_id in creator_user_ids {
            if self.check_eligible(server.campaign_id, user_id).await.is_err() {
                outcome.skipped.push(user_id);
                continue;
            }
            if self.channel_repo.is_member(channel_id, user_id).await? {
                outcome.skipped.push(user_id);
                continue;
            }
            self.channel_repo
                .add_member(&ChannelMember {
                    channel_id,
                    user_id,
                    added_by,
                    added_at: Utc::now(),
                })
                .await?;
            outcome.added.push(user_id);
        }

        Ok(outcome)
    }

    async fn list_server_members(&self, server_id: i64) -> Result<Vec<MemberView>, AppError> {
        let members = self.member_repo.find_by_server(server_id).await?;
        let ids: Vec<i64> = members.iter().map(|m| m.user_id).collect();
        let profiles: HashMap<i64, UserProfile> = self
            .profile_repo
            .find_profiles(&ids)
            .await?
            .into_iter()
            .map(|p| (p.user_id, p))
            .collect();

        Ok(members
            .iter()
            .filter_map(|m| {
                profiles
                    .get(&m.user_id)
                    .map(|p| Self::view_from(p, Some(m.role), m.joined_at))
            })
            .collect())
    }

    async fn list_channel_users(
        &self,
        server_id: i64,
        channel_id: i64,
    ) -> Result<Vec<MemberView>, AppError> {
        let channel = self.channel_under_server(server_id, channel_id).await?;

        if !channel.is_private() {
            return self.list_server_members(server_id).await;
        }

        let channel_members = self.channel_repo.find_members(channel_id).await?;
        let admins = self.member_repo.find_admins(server_id).await?;
        let server_members: HashMap<i64, MemberRole> = self
            .member_repo
            .find_by_server(server_id)
            .await?
            .into_iter()
            .map(|m| (m.user_id, m.role))
            .collect();

        // Channel members first so their join timestamp wins the dedup.
        let mut seen: HashSet<i64> = HashSet::new();
        let mut rows: Vec<(i64, Option<MemberRole>, DateTime<Utc>)> = Vec::new();
        for cm in &channel_members {
            if seen.insert(cm.user_id) {
                rows.push((cm.user_id, server_members.get(&cm.user_id).copied(), cm.added_at));
            }
        }
        for admin in &admins {
            if seen.insert(admin.user_id) {
                rows.push((admin.user_id, Some(admin.role), admin.joined_at));
            }
        }

        let ids: Vec<i64> = rows.iter().map(|(id, _, _)| *id).collect();
        let profiles: HashMap<i64, UserProfile> = self
            .profile_repo
            .find_profiles(&ids)
            .await?
            .into_iter()
            .map(|p| (p.user_id, p))
            .collect();

        let mut views: Vec<MemberView> = rows
            .iter()
            .filter_map(|(id, role, joined_at)| {
                profiles.get(id).map(|p| Self::view_from(p, *role, *joined_at))
            })
            .collect();
        views.sort_by_key(|v| v.user_id);
        Ok(views)
    }

    async fn leave_server(&self, server_id: i64, user_id: i64) -> Result<(), AppError> {
        let membership = self
            .member_repo
            .find(server_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Membership not found".to_string()))?;

        if membership.is_admin() {
            return Err(AppError::Forbidden(
                "Admins cannot leave their own server".to_string(),
            ));
        }

        self.member_repo
            .remove_with_channel_memberships(server_id, user_id)
            .await
    }

    async fn kick_member(
        &self,
        server_id: i64,
        actor_id: i64,
        target_user_id: i64,
    ) -> Result<(), AppError> {
        let actor = self.member_repo.find(server_id, actor_id).await?;
        if !visibility::is_server_admin(actor.as_ref()) {
            return Err(AppError::Forbidden(
                "Admin membership required".to_string(),
            ));
        }

        let target = self
            .member_repo
            .find(server_id, target_user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;
        if target.is_admin() {
            return Err(AppError::Forbidden("Admins cannot be kicked".to_string()));
        }

        self.member_repo
            .remove_with_channel_memberships(server_id, target_user_id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        ChannelState, ChatServer, MockCampaignRepository, MockChannelRepository,
        MockMemberRepository, MockProfileRepository, MockServerRepository, ServerMember,
    };

    fn channel(id: i64, server_id: i64, state: ChannelState) -> Channel {
        Channel {
            id,
            server_id,
            name: "general".to_string(),
            kind: "text".to_string(),
            description: None,
            state,
            created_at: Utc::now(),
        }
    }

    fn creator_profile(user_id: i64) -> UserProfile {
        UserProfile {
            user_id,
            email: format!("creator{user_id}@example.com"),
            user_type: UserType::Creator,
            display_name: Some(format!("Creator {user_id}")),
            avatar_url: None,
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

    fn make_service(
        channel_repo: MockChannelRepository,
        server_repo: MockServerRepository,
        member_repo: MockMemberRepository,
        campaign_repo: MockCampaignRepository,
        profile_repo: MockProfileRepository,
    ) -> MemberServiceImpl<
        MockChannelRepository,
        MockServerRepository,
        MockMemberRepository,
        MockCampaignRepository,
        MockProfileRepository,
    > {
        MemberServiceImpl::new(
            Arc::new(channel_repo),
            Arc::new(server_repo),
            Arc::new(member_repo),
            Arc::new(campaign_repo),
            Arc::new(profile_repo),
        )
    }

    fn server_repo_with(server_id: i64, campaign_id: i64) -> MockServerRepository {
        let mut repo = MockServerRepository::new();
        repo.expect_find_by_id().returning(move |id| {
            Ok((id == server_id).then(|| ChatServer {
                id,
                campaign_id,
                name: "Campaign Chat".to_string(),
                created_at: Utc::now(),
            }))
        });
        repo
    }

    #[tokio::test]
    async fn add_member_rejects_non_participant() {
        let mut channel_repo = MockChannelRepository::new();
        channel_repo
            .expect_find_by_id()
            .returning(|id| Ok(Some(channel(id, 1, ChannelState::Private))));
        let mut campaign_repo = MockCampaignRepository::new();
        campaign_repo
            .expect_is_approved_participant()
            .returning(|_, _| Ok(false));
        let mut profile_repo = MockProfileRepository::new();
        profile_repo
            .expect_find_profile()
            .returning(|id| Ok(Some(creator_profile(id))));

        let svc = make_service(
            channel_repo,
            server_repo_with(1, 10),
            MockMemberRepository::new(),
            campaign_repo,
            profile_repo,
        );

        let err = svc.add_member(1, 7, 42, 99).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg.contains("approved participant")));
    }

    #[tokio::test]
    async fn add_member_rejects_channel_outside_server() {
        let mut channel_repo = MockChannelRepository::new();
        channel_repo
            .expect_find_by_id()
            .returning(|id| Ok(Some(channel(id, 2, ChannelState::Public))));

        let svc = make_service(
            channel_repo,
            server_repo_with(1, 10),
            MockMemberRepository::new(),
            MockCampaignRepository::new(),
            MockProfileRepository::new(),
        );

        let err = svc.add_member(1, 7, 42, 99).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn add_member_is_idempotent_for_existing_member() {
        let mut channel_repo = MockChannelRepository::new();
        channel_repo
            .expect_find_by_id()
            .returning(|id| Ok(Some(channel(id, 1, ChannelState::Private))));
        channel_repo.expect_is_member().returning(|_, _| Ok(true));
        channel_repo.expect_add_member().never();
        let mut campaign_repo = MockCampaignRepository::new();
        campaign_repo
            .expect_is_approved_participant()
            .returning(|_, _| Ok(true));
        let mut profile_repo = MockProfileRepository::new();
        profile_repo
            .expect_find_profile()
            .returning(|id| Ok(Some(creator_profile(id))));

        let svc = make_service(
            channel_repo,
            server_repo_with(1, 10),
            MockMemberRepository::new(),
            campaign_repo,
            profile_repo,
        );

        assert!(svc.add_member(1, 7, 42, 99).await.is_ok());
    }

    #[tokio::test]
    async fn add_members_partitions_eligible_and_skipped() {
        let mut channel_repo = MockChannelRepository::new();
        channel_repo
            .expect_find_by_id()
            .returning(|id| Ok(Some(channel(id, 1, ChannelState::Private))));
        channel_repo.expect_is_member().returning(|_, _| Ok(false));
        channel_repo.expect_add_member().returning(|_| Ok(()));
        let mut campaign_repo = MockCampaignRepository::new();
        campaign_repo
            .expect_is_approved_participant()
            .returning(|user_id, _| Ok(user_id != 43));
        let mut profile_repo = MockProfileRepository::new();
        profile_repo.expect_find_profile().returning(|id| {
            if id == 44 {
                // A business account sneaking into the batch.
                Ok(Some(UserProfile {
                    user_type: UserType::Business,
                    ..creator_profile(id)
                }))
            } else {
                Ok(Some(creator_profile(id)))
            }
        });

        let svc = make_service(
            channel_repo,
            server_repo_with(1, 10),
            MockMemberRepository::new(),
            campaign_repo,
            profile_repo,
        );

        let outcome = svc.add_members(1, 7, &[42, 43, 44, 45], 99).await.unwrap();
        assert_eq!(outcome.added, vec![42, 45]);
        assert_eq!(outcome.skipped, vec![43, 44]);
    }

    #[tokio::test]
    async fn leave_server_refuses_admins() {
        let mut member_repo = MockMemberRepository::new();
        member_repo
            .expect_find()
            .returning(|s, u| Ok(Some(member(s, u, MemberRole::Admin))));
        member_repo.expect_remove_with_channel_memberships().never();

        let svc = make_service(
            MockChannelRepository::new(),
            MockServerRepository::new(),
            member_repo,
            MockCampaignRepository::new(),
            MockProfileRepository::new(),
        );

        let err = svc.leave_server(1, 42).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn kick_requires_admin_actor_and_non_admin_target() {
        let mut member_repo = MockMemberRepository::new();
        member_repo.expect_find().returning(|s, u| {
            Ok(Some(member(
                s,
                u,
                if u == 1 { MemberRole::Admin } else { MemberRole::User },
            )))
        });
        member_repo
            .expect_remove_with_channel_memberships()
            .withf(|s, u| *s == 1 && *u == 42)
            .returning(|_, _| Ok(()));

        let svc = make_service(
            MockChannelRepository::new(),
            MockServerRepository::new(),
            member_repo,
            MockCampaignRepository::new(),
            MockProfileRepository::new(),
        );

        assert!(svc.kick_member(1, 1, 42).await.is_ok());

        // A plain member acting as kicker is refused.
        let err = svc.kick_member(1, 42, 1).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn channel_users_prefers_channel_join_timestamp() {
        let channel_joined = Utc::now();
        let mut channel_repo = MockChannelRepository::new();
        channel_repo
            .expect_find_by_id()
            .returning(|id| Ok(Some(channel(id, 1, ChannelState::Private))));
        channel_repo.expect_find_members().returning(move |_| {
            Ok(vec![ChannelMember {
                channel_id: 7,
                user_id: 42,
                added_by: 1,
                added_at: channel_joined,
            }])
        });
        let mut member_repo = MockMemberRepository::new();
        // User 42 is also an admin, so both sources yield them once.
        member_repo
            .expect_find_admins()
            .returning(|s| Ok(vec![member(s, 42, MemberRole::Admin)]));
        member_repo
            .expect_find_by_server()
            .returning(|s| Ok(vec![member(s, 42, MemberRole::Admin)]));
        let mut profile_repo = MockProfileRepository::new();
        profile_repo
            .expect_find_profiles()
            .returning(|ids| Ok(ids.iter().map(|&id| creator_profile(id)).collect()));

        let svc = make_service(
            channel_repo,
            MockServerRepository::new(),
            member_repo,
            MockCampaignRepository::new(),
            profile_repo,
        );

        let users = svc.list_channel_users(1, 7).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].user_id, 42);
        assert_eq!(users[0].joined_at, channel_joined);
        assert_eq!(users[0].role, Some(MemberRole::Admin));
    }
}
