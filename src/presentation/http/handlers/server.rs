//! Server Handlers

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use validator::Validate;

use crate::application::dto::request::RenameServerRequest;
use crate::application::dto::response::ServerResponse;
use crate::application::services::{AccessService, ServerService};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

/// Rename a server (admin only)
pub async fn rename_server(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(server_id): Path<i64>,
    Json(body): Json<RenameServerRequest>,
) -> Result<Json<ServerResponse>, AppError> {
    body.validate().map_err(validation_error)?;

    state
        .access_service()
        .admin_server(server_id, auth.user_id)
        .await?;

    let server = state
        .server_service()
        .rename_server(server_id, &body.name)
        .await?;

    Ok(Json(ServerResponse::from(server)))
}
