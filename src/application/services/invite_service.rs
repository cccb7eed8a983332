//! Invite Service
//!
//! Server invite lifecycle: creation with eligibility checks, the
//! pending/declined/accepted state machine, and the atomic accept path
//! that joins invite, campaign participation, and server membership.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::{
    CampaignRepository, ChatServer, InviteRepository, InviteStatus, MemberRepository,
    ProfileRepository, ServerInvite, ServerRepository, UserProfile, UserType,
};
use crate::shared::error::AppError;
use crate::shared::snowflake::SnowflakeGenerator;

/// The invitee's answer to a pending invite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InviteAction {
    Accept,
    Decline,
}

/// Outcome of a bulk invite: who got a live pending invite and who was
/// skipped, without per-id reasons.
#[derive(Debug, Clone, Default)]
pub struct InviteBatchOutcome {
    pub invited: Vec<i64>,
    pub skipped: Vec<i64>,
}

/// An invite joined with the invitee's display identity.
#[derive(Debug, Clone)]
pub struct InviteView {
    pub invite: ServerInvite,
    pub invited_user: Option<UserProfile>,
}

/// Invite operations.
#[async_trait]
pub trait InviteService: Send + Sync {
    /// Invite one creator. Pending invites are returned idempotently,
    /// declined invites reset to pending, accepted invites refuse.
    async fn create_invite(
        &self,
        server_id: i64,
        creator_user_id: i64,
        invited_by: i64,
    ) -> Result<ServerInvite, AppError>;

    /// Bulk invite with the same eligibility rules; pending and accepted
    /// invites are skipped, declined ones re-issued.
    async fn create_invites(
        &self,
        server_id: i64,
        creator_user_ids: &[i64],
        invited_by: i64,
    ) -> Result<InviteBatchOutcome, AppError>;

    /// Accept or decline a pending invite as the invitee.
    async fn respond_to_invite(
        &self,
        invite_id: i64,
        user_id: i64,
        action: InviteAction,
    ) -> Result<ServerInvite, AppError>;

    /// All invites for a server, joined with invitee identities.
    async fn list_invites(&self, server_id: i64) -> Result<Vec<InviteView>, AppError>;

    /// Approved creator participants who are neither members nor holders
    /// of a pending or accepted invite.
    async fn list_invitable(&self, server_id: i64) -> Result<Vec<UserProfile>, AppError>;
}

/// InviteService implementation.
pub struct InviteServiceImpl<I, S, M, G, P>
where
    I: InviteRepository,
    S: ServerRepository,
    M: MemberRepository,
    G: CampaignRepository,
    P: ProfileRepository,
{
    invite_repo: Arc<I>,
    server_repo: Arc<S>,
    member_repo: Arc<M>,
    campaign_repo: Arc<G>,
    profile_repo: Arc<P>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<I, S, M, G, P> InviteServiceImpl<I, S, M, G, P>
where
    I: InviteRepository,
    S: ServerRepository,
    M: MemberRepository,
    G: CampaignRepository,
    P: ProfileRepository,
{
    pub fn new(
        invite_repo: Arc<I>,
        server_repo: Arc<S>,
        member_repo: Arc<M>,
        campaign_repo: Arc<G>,
        profile_repo: Arc<P>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            invite_repo,
            server_repo,
            member_repo,
            campaign_repo,
            profile_repo,
            id_generator,
        }
    }

    async fn require_server(&self, server_id: i64) -> Result<ChatServer, AppError> {
        self.server_repo
            .find_by_id(server_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Server not found".to_string()))
    }

    /// Invite eligibility: a creator who is not yet a member and not
    /// already an approved participant (acceptance is what grants
    /// participation).
    async fn check_invitable(
        &self,
        server: &ChatServer,
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
        if self.member_repo.is_member(server.id, user_id).await? {
            return Err(AppError::BadRequest(
                "User is already a member".to_string(),
            ));
        }
        if self
            .campaign_repo
            .is_approved_participant(user_id, server.campaign_id)
            .await?
        {
            return Err(AppError::BadRequest(
                "User is already an approved participant".to_string(),
            ));
        }
        Ok(())
    }

    fn new_invite(&self, server_id: i64, invited_user_id: i64, invited_by: i64) -> ServerInvite {
        ServerInvite {
            id: self.id_generator.generate(),
            server_id,
            invited_user_id,
            invited_by,
            status: InviteStatus::Pending,
            responded_at: None,
            created_at: Utc::now(),
        }
    }
}

#[async_trait]
impl<I, S, M, G, P> InviteService for InviteServiceImpl<I, S, M, G, P>
where
    I: InviteRepository + 'static,
    S: ServerRepository + 'static,
    M: MemberRepository + 'static,
    G: CampaignRepository + 'static,
    P: ProfileRepository + 'static,
{
    async fn create_invite(
        &self,
        server_id: i64,
        creator_user_id: i64,
        invited_by: i64,
    ) -> Result<ServerInvite, AppError> {
        let server = self.require_server(server_id).await?;
        self.check_invitable(&server, creator_user_id).await?;

        match self.invite_repo.find_for_user(server_id, creator_user_id).await? {
            Some(existing) => match existing.status {
                InviteStatus::Pending => Ok(existing),
                InviteStatus::Declined => {
                    self.invite_repo
                        .reset_to_pending(existing.id, invited_by)
                        .await
                }
                InviteStatus::Accepted => Err(AppError::BadRequest(
                    "Invite already accepted".to_string(),
                )),
            },
            None => {
                let invite = self.new_invite(server_id, creator_user_id, invited_by);
                self.invite_repo.create(&invite).await
            }
        }
    }

    async fn create_invites(
        &self,
        server_id: i64,
        creator_user_ids: &[i64],
        invited_by: i64,
    ) -> Result<InviteBatchOutcome, AppError> {
        let server = self.require_server(server_id).await?;

        let mut outcome = InviteBatchOutcome::default();
        for &user_id in creator_user_ids {
            if self.check_invitable(&server, user_id).await.is_err() {
                outcome.skipped.push(user_id);
                continue;
            }
            match self.invite_repo.find_for_user(server_id, user_id).await? {
                Some(existing) => match existing.status {
                    InviteStatus::Declined => {
                        self.invite_repo
                            .reset_to_pending(existing.id, invited_by)
                            .await?;
                        outcome.invited.push(user_id);
                    }
                    InviteStatus::Pending | InviteStatus::Accepted => {
                        outcome.skipped.push(user_id);
                    }
                },
                None => {
                    let invite = self.new_invite(server_id, user_id, invited_by);
                    self.invite_repo.create(&invite).await?;
                    outcome.invited.push(user_id);
                }
            }
        }

        Ok(outcome)
    }

    async fn respond_to_invite(
        &self,
        invite_id: i64,
        user_id: i64,
        action: InviteAction,
    ) -> Result<ServerInvite, AppError> {
        let mut invite = self
            .invite_repo
            .find_by_id(invite_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Invite not found".to_string()))?;

        if invite.invited_user_id != user_id {
            return Err(AppError::Forbidden(
                "Invite belongs to another user".to_string(),
            ));
        }
        if !invite.is_pending() {
            return Err(AppError::BadRequest(
                "Invite is no longer pending".to_string(),
            ));
        }

        match action {
            InviteAction::Decline => {
                self.invite_repo.decline(invite_id).await?;
                invite.status = InviteStatus::Declined;
            }
            InviteAction::Accept => {
                let server = self.require_server(invite.server_id).await?;
                self.invite_repo
                    .accept(invite_id, server.id, server.campaign_id, user_id)
                    .await?;
                invite.status = InviteStatus::Accepted;
            }
        }
        invite.responded_at = Some(Utc::now());

        Ok(invite)
    }

    async fn list_invites(&self, server_id: i64) -> Result<Vec<InviteView>, AppError> {
        self.require_server(server_id).await?;
        let invites = self.invite_repo.find_by_server(server_id).await?;
        let ids: Vec<i64> = invites.iter().map(|i| i.invited_user_id).collect();
        let mut profiles: HashMap<i64, UserProfile> = self
            .profile_repo
            .find_profiles(&ids)
            .await?
            .into_iter()
            .map(|p| (p.user_id, p))
            .collect();

        Ok(invites
            .into_iter()
            .map(|invite| {
                let invited_user = profiles.remove(&invite.invited_user_id);
                InviteView {
                    invite,
                    invited_user,
                }
            })
            .collect())
    }

    async fn list_invitable(&self, server_id: i64) -> Result<Vec<UserProfile>, AppError> {
        let server = self.require_server(server_id).await?;

        let members: HashSet<i64> = self
            .member_repo
            .find_by_server(server_id)
            .await?
            .into_iter()
            .map(|m| m.user_id)
            .collect();
        let blocked_by_invite: HashSet<i64> = self
            .invite_repo
            .find_by_server(server_id)
            .await?
            .into_iter()
            .filter(|i| i.status != InviteStatus::Declined)
            .map(|i| i.invited_user_id)
            .collect();

        let candidates: Vec<i64> = self
            .campaign_repo
            .approved_participant_ids(server.campaign_id)
            .await?
            .into_iter()
            .filter(|id| !members.contains(id) && !blocked_by_invite.contains(id))
            .collect();

        let profiles = self.profile_repo.find_profiles(&candidates).await?;
        Ok(profiles
            .into_iter()
            .filter(|p| p.user_type == UserType::Creator)
            .collect())
    }
}
