//! Request DTOs
//!
//! Data structures for API request bodies.

use serde::Deserialize;
use validator::Validate;

use crate::application::services::{CreateChannelDto, UpdateChannelDto};
use crate::domain::ChannelState;

/// Rename server request
#[derive(Debug, Deserialize, Validate)]
pub struct RenameServerRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
}

/// Create channel request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateChannelRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    /// Descriptive tag; not authorization-relevant.
    pub kind: Option<String>,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    pub state: Option<ChannelState>,

    #[serde(default)]
    pub member_user_ids: Vec<i64>,
}

impl From<CreateChannelRequest> for CreateChannelDto {
    fn from(request: CreateChannelRequest) -> Self {
        Self {
            name: request.name,
            kind: request.kind,
            description: request.description,
            state: request.state,
            member_user_ids: request.member_user_ids,
        }
    }
}

/// Update channel request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateChannelRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    pub state: Option<ChannelState>,
}

impl From<UpdateChannelRequest> for UpdateChannelDto {
    fn from(request: UpdateChannelRequest) -> Self {
        Self {
            name: request.name,
            description: request.description,
            state: request.state,
        }
    }
}

/// Bulk add channel members request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddMembersRequest {
    #[validate(length(min = 1, message = "At least one user id is required"))]
    pub user_ids: Vec<i64>,
}

/// Create invites request; accepts a single creator id or a batch
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvitesRequest {
    pub user_id: Option<i64>,
    #[serde(default)]
    pub user_ids: Vec<i64>,
}

/// Invite response request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RespondInviteRequest {
    /// "accepted" or "declined".
    pub action: String,
}
