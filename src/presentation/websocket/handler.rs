//! WebSocket Connection Handler
//!
//! Authenticates the handshake, upgrades the socket, and runs the
//! per-connection read loop.

use std::collections::HashMap;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;

use super::events;
use super::messages::{ClientEvent, ServerEvent};
use crate::presentation::middleware::auth::{verify_token, AuthUser};
use crate::startup::AppState;

/// WebSocket upgrade handler for `/gateway`.
///
/// The bearer credential comes from the `token` query parameter or the
/// Authorization header; a missing or invalid credential is refused
/// with 401 before the upgrade ever happens.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let token = params
        .get("token")
        .map(String::as_str)
        .or_else(|| {
            headers
                .get(AUTHORIZATION)
                .and_then(|h| h.to_str().ok())
                .map(|h| h.strip_prefix("Bearer ").unwrap_or(h))
        });

    let user = match token.map(|t| verify_token(t, &state.settings.jwt.secret)) {
        Some(Ok(user)) => user,
        Some(Err(e)) => {
            tracing::debug!(error = %e, "Gateway handshake refused");
            return StatusCode::UNAUTHORIZED.into_response();
        }
        None => return StatusCode::UNAUTHORIZED.into_response(),
    };

    let max_message_size = state.settings.websocket.max_message_size;
    ws.max_message_size(max_message_size)
        .on_upgrade(move |socket| handle_socket(socket, state, user))
}

/// Run one authenticated connection until the socket closes.
async fn handle_socket(socket: WebSocket, state: AppState, user: AuthUser) {
    let conn_id = Uuid::new_v4().to_string();
    let user_id = user.user_id;

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();

    state.gateway.register(conn_id.clone(), user_id, tx);

    // Forward queued events onto the socket.
    let sender_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(t) => t,
                Err(e) => {
                    tracing::error!("Failed to serialize gateway event: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    state
        .gateway
        .send_to_connection(&conn_id, ServerEvent::Connected { user_id });

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientEvent>(&text) {
                Ok(event) => events::dispatch(&state, &conn_id, user_id, event).await,
                Err(e) => {
                    tracing::debug!(conn_id = %conn_id, error = %e, "Unparseable client frame");
                    state.gateway.send_to_connection(
                        &conn_id,
                        ServerEvent::Error {
                            message: "Invalid event payload".to_string(),
                        },
                    );
                }
            },
            Ok(Message::Close(_)) => break,
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                // Pong replies are handled by axum.
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    events::handle_disconnect(&state, &conn_id).await;
    sender_task.abort();

    tracing::info!(user_id, conn_id = %conn_id, "User disconnected");
}
