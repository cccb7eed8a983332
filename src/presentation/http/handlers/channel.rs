//! Channel Handlers

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::application::dto::request::{CreateChannelRequest, UpdateChannelRequest};
use crate::application::dto::response::{ChannelResponse, CreateChannelResponse};
use crate::application::services::{AccessService, ChannelService};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

/// List channels visible to the caller
pub async fn list_channels(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(server_id): Path<i64>,
) -> Result<Json<Vec<ChannelResponse>>, AppError> {
    let channels = state
        .channel_service()
        .list_visible(server_id, auth.user_id)
        .await?;

    Ok(Json(channels.into_iter().map(ChannelResponse::from).collect()))
}

/// Create a channel (admin only)
pub async fn create_channel(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(server_id): Path<i64>,
    Json(body): Json<CreateChannelRequest>,
) -> Result<(StatusCode, Json<CreateChannelResponse>), AppError> {
    body.validate().map_err(validation_error)?;

    state
        .access_service()
        .admin_server(server_id, auth.user_id)
        .await?;

    let created = state
        .channel_service()
        .create_channel(server_id, auth.user_id, body.into())
        .await?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Update a channel (admin only)
pub async fn update_channel(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((server_id, channel_id)): Path<(i64, i64)>,
    Json(body): Json<UpdateChannelRequest>,
) -> Result<Json<ChannelResponse>, AppError> {
    body.validate().map_err(validation_error)?;

    state
        .access_service()
        .admin_server(server_id, auth.user_id)
        .await?;

    let channel = state
        .channel_service()
        .update_channel(server_id, channel_id, body.into())
        .await?;

    Ok(Json(ChannelResponse::from(channel)))
}

/// Delete a channel (admin only)
pub async fn delete_channel(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((server_id, channel_id)): Path<(i64, i64)>,
) -> Result<StatusCode, AppError> {
    state
        .access_service()
        .admin_server(server_id, auth.user_id)
        .await?;

    state
        .channel_service()
        .delete_channel(server_id, channel_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
