//! Invite Handlers

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::application::dto::request::{CreateInvitesRequest, RespondInviteRequest};
use crate::application::dto::response::{
    InvitableUserResponse, InviteBatchResponse, InviteResponse,
};
use crate::application::services::{AccessService, InviteAction, InviteService};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Create one invite or a batch (admin only)
pub async fn create_invites(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(server_id): Path<i64>,
    Json(body): Json<CreateInvitesRequest>,
) -> Result<Response, AppError> {
    state
        .access_service()
        .admin_server(server_id, auth.user_id)
        .await?;

    let service = state.invite_service();

    // A single id gets strict semantics and a full invite body; a batch
    // partitions into invited/skipped without failing as a whole.
    if let Some(user_id) = body.user_id {
        let invite = service
            .create_invite(server_id, user_id, auth.user_id)
            .await?;
        return Ok((StatusCode::CREATED, Json(InviteResponse::from(invite))).into_response());
    }

    if body.user_ids.is_empty() {
        return Err(AppError::BadRequest(
            "At least one user id is required".to_string(),
        ));
    }

    let outcome = service
        .create_invites(server_id, &body.user_ids, auth.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(InviteBatchResponse::from(outcome))).into_response())
}

/// List a server's invites (admin only)
pub async fn list_invites(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(server_id): Path<i64>,
) -> Result<Json<Vec<InviteResponse>>, AppError> {
    state
        .access_service()
        .admin_server(server_id, auth.user_id)
        .await?;

    let invites = state.invite_service().list_invites(server_id).await?;
    Ok(Json(invites.into_iter().map(InviteResponse::from).collect()))
}

/// List invitable creators (admin only)
pub async fn list_invitable(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(server_id): Path<i64>,
) -> Result<Json<Vec<InvitableUserResponse>>, AppError> {
    state
        .access_service()
        .admin_server(server_id, auth.user_id)
        .await?;

    let users = state.invite_service().list_invitable(server_id).await?;
    Ok(Json(
        users.into_iter().map(InvitableUserResponse::from).collect(),
    ))
}

/// Accept or decline an invite (invitee only)
pub async fn respond_to_invite(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(invite_id): Path<i64>,
    Json(body): Json<RespondInviteRequest>,
) -> Result<Json<InviteResponse>, AppError> {
    let action = match body.action.as_str() {
        "accepted" => InviteAction::Accept,
        "declined" => InviteAction::Decline,
        _ => {
            return Err(AppError::BadRequest(
                "Action must be 'accepted' or 'declined'".to_string(),
            ))
        }
    };

    let invite = state
        .invite_service()
        .respond_to_invite(invite_id, auth.user_id, action)
        .await?;

    Ok(Json(InviteResponse::from(invite)))
}
