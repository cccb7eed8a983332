//! Route Configuration
//!
//! Configures all HTTP routes for the API.

use axum::{
    middleware,
    response::IntoResponse,
    routing::{delete, get, patch, post},
    Router,
};

use super::handlers;
use crate::infrastructure::metrics;
use crate::presentation::middleware::auth_middleware;
use crate::presentation::websocket::ws_handler;
use crate::startup::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_routes(state.clone()))
        // WebSocket gateway endpoint; handshake auth happens inside the
        // handler so it can also read the token query parameter.
        .route("/gateway", get(ws_handler))
        // Health check endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        // Prometheus metrics endpoint
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// Prometheus metrics endpoint handler
async fn metrics_handler() -> impl IntoResponse {
    let metrics = metrics::gather_metrics();
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        metrics,
    )
}

/// API v1 routes
fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/servers", server_routes(state.clone()))
        .nest("/invites", invite_routes(state))
}

/// Server-scoped routes (protected)
fn server_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/{server_id}", patch(handlers::server::rename_server))
        .route("/{server_id}/members", get(handlers::member::list_members))
        .route(
            "/{server_id}/invitable",
            get(handlers::invite::list_invitable),
        )
        .route(
            "/{server_id}/invites",
            post(handlers::invite::create_invites).get(handlers::invite::list_invites),
        )
        .route(
            "/{server_id}/channels",
            get(handlers::channel::list_channels).post(handlers::channel::create_channel),
        )
        .route(
            "/{server_id}/channels/{channel_id}",
            patch(handlers::channel::update_channel),
        )
        .route(
            "/{server_id}/channels/{channel_id}",
            delete(handlers::channel::delete_channel),
        )
        .route(
            "/{server_id}/channels/{channel_id}/users",
            get(handlers::member::list_channel_users),
        )
        .route(
            "/{server_id}/channels/{channel_id}/members",
            post(handlers::member::add_members),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Invite routes (protected)
fn invite_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/{invite_id}/respond",
            post(handlers::invite::respond_to_invite),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
