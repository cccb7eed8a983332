//! Response DTOs
//!
//! Data structures for API response bodies.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::application::services::{
    BulkAddOutcome, CreatedChannel, InviteBatchOutcome, InviteView, MemberView,
};
use crate::domain::{Channel, ChatServer, ServerInvite, UserProfile};

/// Chat server response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerResponse {
    pub id: i64,
    pub campaign_id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<ChatServer> for ServerResponse {
    fn from(server: ChatServer) -> Self {
        Self {
            id: server.id,
            campaign_id: server.campaign_id,
            name: server.name,
            created_at: server.created_at,
        }
    }
}

/// Channel response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelResponse {
    pub id: i64,
    pub server_id: i64,
    pub name: String,
    pub kind: String,
    pub description: Option<String>,
    pub state: String,
    pub created_at: DateTime<Utc>,
}

impl From<Channel> for ChannelResponse {
    fn from(channel: Channel) -> Self {
        Self {
            id: channel.id,
            server_id: channel.server_id,
            name: channel.name,
            kind: channel.kind,
            description: channel.description,
            state: channel.state.as_str().to_string(),
            created_at: channel.created_at,
        }
    }
}

/// Channel creation response: the channel plus the member provisioning
/// outcome.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChannelResponse {
    pub channel: ChannelResponse,
    pub added_user_ids: Vec<i64>,
    pub skipped_user_ids: Vec<i64>,
}

impl From<CreatedChannel> for CreateChannelResponse {
    fn from(created: CreatedChannel) -> Self {
        Self {
            channel: created.channel.into(),
            added_user_ids: created.members.added,
            skipped_user_ids: created.members.skipped,
        }
    }
}

/// Bulk member add response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMembersResponse {
    pub added_user_ids: Vec<i64>,
    pub skipped_user_ids: Vec<i64>,
}

impl From<BulkAddOutcome> for AddMembersResponse {
    fn from(outcome: BulkAddOutcome) -> Self {
        Self {
            added_user_ids: outcome.added,
            skipped_user_ids: outcome.skipped,
        }
    }
}

/// Member listing entry
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberResponse {
    pub user_id: i64,
    pub email: String,
    pub user_type: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Option<String>,
    pub joined_at: DateTime<Utc>,
}

impl From<MemberView> for MemberResponse {
    fn from(view: MemberView) -> Self {
        Self {
            user_id: view.user_id,
            email: view.email,
            user_type: view.user_type.as_str().to_string(),
            display_name: view.display_name,
            avatar_url: view.avatar_url,
            role: view.role.map(|r| r.as_str().to_string()),
            joined_at: view.joined_at,
        }
    }
}

/// Invitable user entry
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitableUserResponse {
    pub user_id: i64,
    pub email: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl From<UserProfile> for InvitableUserResponse {
    fn from(profile: UserProfile) -> Self {
        Self {
            user_id: profile.user_id,
            email: profile.email,
            display_name: profile.display_name,
            avatar_url: profile.avatar_url,
        }
    }
}

/// Invite response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteResponse {
    pub id: i64,
    pub server_id: i64,
    pub invited_user_id: i64,
    pub invited_by: i64,
    pub status: String,
    pub responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invited_user: Option<InvitableUserResponse>,
}

impl From<ServerInvite> for InviteResponse {
    fn from(invite: ServerInvite) -> Self {
        Self {
            id: invite.id,
            server_id: invite.server_id,
            invited_user_id: invite.invited_user_id,
            invited_by: invite.invited_by,
            status: invite.status.as_str().to_string(),
            responded_at: invite.responded_at,
            created_at: invite.created_at,
            invited_user: None,
        }
    }
}

impl From<InviteView> for InviteResponse {
    fn from(view: InviteView) -> Self {
        let mut response = InviteResponse::from(view.invite);
        response.invited_user = view.invited_user.map(Into::into);
        response
    }
}

/// Bulk invite response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteBatchResponse {
    pub invited: usize,
    pub invited_user_ids: Vec<i64>,
    pub skipped_user_ids: Vec<i64>,
}

impl From<InviteBatchOutcome> for InviteBatchResponse {
    fn from(outcome: InviteBatchOutcome) -> Self {
        Self {
            invited: outcome.invited.len(),
            invited_user_ids: outcome.invited,
            skipped_user_ids: outcome.skipped,
        }
    }
}
