//! Member Handlers

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use validator::Validate;

use crate::application::dto::request::AddMembersRequest;
use crate::application::dto::response::{AddMembersResponse, MemberResponse};
use crate::application::services::{AccessService, MemberService};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

/// List server members (viewer access)
pub async fn list_members(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(server_id): Path<i64>,
) -> Result<Json<Vec<MemberResponse>>, AppError> {
    state
        .access_service()
        .view_server(server_id, auth.user_id)
        .await?;

    let members = state.member_service().list_server_members(server_id).await?;
    Ok(Json(members.into_iter().map(MemberResponse::from).collect()))
}

/// List a channel's users (viewer access to the channel)
pub async fn list_channel_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((server_id, channel_id)): Path<(i64, i64)>,
) -> Result<Json<Vec<MemberResponse>>, AppError> {
    state
        .access_service()
        .view_channel(channel_id, auth.user_id)
        .await?;

    let users = state
        .member_service()
        .list_channel_users(server_id, channel_id)
        .await?;
    Ok(Json(users.into_iter().map(MemberResponse::from).collect()))
}

/// Bulk add channel members (admin only)
pub async fn add_members(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((server_id, channel_id)): Path<(i64, i64)>,
    Json(body): Json<AddMembersRequest>,
) -> Result<Json<AddMembersResponse>, AppError> {
    body.validate().map_err(validation_error)?;

    state
        .access_service()
        .admin_server(server_id, auth.user_id)
        .await?;

    let outcome = state
        .member_service()
        .add_members(server_id, channel_id, &body.user_ids, auth.user_id)
        .await?;

    Ok(Json(outcome.into()))
}
