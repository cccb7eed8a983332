//! Gateway Event Handlers
//!
//! One handler per client event. Every handler re-validates access on
//! each call; room membership is never trusted as an authorization
//! proxy. Failures become a scoped `error` frame on the originating
//! connection and the socket stays open.

use crate::application::services::{AccessService, MemberService, MessageService};
use crate::domain::services::presence::partition_by_online;
use crate::domain::ChannelRepository;
use crate::infrastructure::metrics;
use crate::infrastructure::repositories::PgChannelRepository;
use crate::shared::error::AppError;
use crate::startup::AppState;

use super::gateway::RoomKey;
use super::messages::{ClientEvent, MessagePayload, PresenceUser, ServerEvent};

/// Route one client event, turning any failure into an `error` frame on
/// the originating connection.
pub async fn dispatch(state: &AppState, conn_id: &str, user_id: i64, event: ClientEvent) {
    let event_name = event.name();
    let result = handle_event(state, conn_id, user_id, event).await;
    metrics::record_gateway_event(event_name, result.is_ok());

    if let Err(err) = result {
        tracing::debug!(conn_id, user_id, event = event_name, error = %err, "Gateway event rejected");
        state.gateway.send_to_connection(
            conn_id,
            ServerEvent::Error {
                message: err.client_message(),
            },
        );
    }
}

async fn handle_event(
    state: &AppState,
    conn_id: &str,
    user_id: i64,
    event: ClientEvent,
) -> Result<(), AppError> {
    match event {
        ClientEvent::ServerOpen { server_id } => {
            state.access_service().view_server(server_id, user_id).await?;
            state.gateway.join_room(conn_id, RoomKey::Server(server_id));
            refresh_server_presence(state, server_id).await
        }

        ClientEvent::ServerClose { server_id } => {
            state.gateway.leave_room(conn_id, RoomKey::Server(server_id));
            refresh_server_presence(state, server_id).await
        }

        ClientEvent::ServerLeave { server_id } => {
            state
                .member_service()
                .leave_server(server_id, user_id)
                .await?;

            let channel_ids = server_channel_ids(state, server_id).await?;
            state
                .gateway
                .evict_user_from_server(user_id, server_id, &channel_ids);
            state
                .gateway
                .send_to_user(user_id, ServerEvent::ServerLeft { server_id });

            refresh_server_presence(state, server_id).await
        }

        ClientEvent::ServerKick {
            server_id,
            user_id: target_user_id,
        } => {
            state
                .member_service()
                .kick_member(server_id, user_id, target_user_id)
                .await?;

            let channel_ids = server_channel_ids(state, server_id).await?;
            state
                .gateway
                .evict_user_from_server(target_user_id, server_id, &channel_ids);
            state
                .gateway
                .send_to_user(target_user_id, ServerEvent::ServerKicked { server_id });
            state.gateway.send_to_connection(
                conn_id,
                ServerEvent::ServerKickOk {
                    server_id,
                    user_id: target_user_id,
                },
            );

            refresh_server_presence(state, server_id).await
        }

        ClientEvent::ChannelOpen {
            server_id,
            channel_id,
        } => {
            let channel = state
                .access_service()
                .view_channel(channel_id, user_id)
                .await?;
            if channel.server_id != server_id {
                return Err(AppError::NotFound("Channel not found".to_string()));
            }

            state.gateway.join_room(conn_id, RoomKey::Channel(channel_id));
            state
                .gateway
                .send_to_connection(conn_id, ServerEvent::Joined { channel_id });
            broadcast_channel_presence(state, server_id, channel_id).await?;

            // The joining connection alone gets the latest page.
            let page = state
                .message_service()
                .history(
                    channel_id,
                    None,
                    Some(state.settings.websocket.history_page_size),
                )
                .await?;
            state
                .gateway
                .send_to_connection(conn_id, ServerEvent::history_page(channel_id, page));
            Ok(())
        }

        ClientEvent::ChannelClose {
            server_id,
            channel_id,
        } => {
            state.gateway.leave_room(conn_id, RoomKey::Channel(channel_id));
            state
                .gateway
                .send_to_connection(conn_id, ServerEvent::Left { channel_id });
            broadcast_channel_presence(state, server_id, channel_id).await
        }

        ClientEvent::MessageSend {
            channel_id,
            content,
        } => {
            let channel = state
                .access_service()
                .view_channel(channel_id, user_id)
                .await?;

            // Persist first; a broadcast must never precede the row.
            let enriched = state
                .message_service()
                .create_message(channel_id, user_id, &content)
                .await?;
            metrics::MESSAGES_SENT_TOTAL
                .with_label_values(&[channel.state.as_str()])
                .inc();

            let payload = MessagePayload::from(enriched);
            let message_id = payload.id;
            state
                .gateway
                .send_to_room(RoomKey::Channel(channel_id), ServerEvent::Message(payload));
            state
                .gateway
                .send_to_connection(conn_id, ServerEvent::MessageAck { id: message_id });
            Ok(())
        }

        ClientEvent::MessageHistory {
            channel_id,
            before_id,
            limit,
        } => {
            state
                .access_service()
                .view_channel(channel_id, user_id)
                .await?;
            let page = state
                .message_service()
                .history(channel_id, before_id, limit)
                .await?;
            state
                .gateway
                .send_to_connection(conn_id, ServerEvent::history_page(channel_id, page));
            Ok(())
        }

        ClientEvent::MessagePin {
            channel_id,
            message_id,
            pinned,
        } => {
            let channel = state
                .access_service()
                .view_channel(channel_id, user_id)
                .await?;
            state
                .access_service()
                .admin_server(channel.server_id, user_id)
                .await?;

            let enriched = state
                .message_service()
                .set_pinned(channel_id, message_id, pinned)
                .await?;
            state.gateway.send_to_room(
                RoomKey::Channel(channel_id),
                ServerEvent::MessagePinned(MessagePayload::from(enriched)),
            );
            state.gateway.send_to_connection(
                conn_id,
                ServerEvent::MessagePinOk { message_id, pinned },
            );
            Ok(())
        }
    }
}

/// Rebroadcast presence for rooms a vanished connection was part of.
pub async fn handle_disconnect(state: &AppState, conn_id: &str) {
    let rooms = state.gateway.unregister(conn_id);
    let channel_repo = PgChannelRepository::new(state.db.clone());

    for room in rooms {
        let result = match room {
            RoomKey::Server(server_id) => broadcast_server_presence(state, server_id).await,
            RoomKey::Channel(channel_id) => match channel_repo.find_by_id(channel_id).await {
                Ok(Some(channel)) => {
                    broadcast_channel_presence(state, channel.server_id, channel_id).await
                }
                Ok(None) => Ok(()),
                Err(e) => Err(e),
            },
        };
        if let Err(err) = result {
            tracing::warn!(conn_id, error = %err, "Presence rebroadcast after disconnect failed");
        }
    }
}

/// Full presence refresh for a server: the server room and every one of
/// its channel rooms get a fresh snapshot.
async fn refresh_server_presence(state: &AppState, server_id: i64) -> Result<(), AppError> {
    broadcast_server_presence(state, server_id).await?;
    for channel_id in server_channel_ids(state, server_id).await? {
        broadcast_channel_presence(state, server_id, channel_id).await?;
    }
    Ok(())
}

async fn server_channel_ids(state: &AppState, server_id: i64) -> Result<Vec<i64>, AppError> {
    let channel_repo = PgChannelRepository::new(state.db.clone());
    Ok(channel_repo
        .find_by_server(server_id)
        .await?
        .into_iter()
        .map(|c| c.id)
        .collect())
}

/// Send a full online/offline snapshot of the server's members to the
/// server room.
async fn broadcast_server_presence(state: &AppState, server_id: i64) -> Result<(), AppError> {
    let members = state
        .member_service()
        .list_server_members(server_id)
        .await?;
    let online_ids = state.gateway.online_user_ids(RoomKey::Server(server_id));
    let (online, offline) = partition_by_online(members, &online_ids, |m| m.user_id);

    state.gateway.send_to_room(
        RoomKey::Server(server_id),
        ServerEvent::ServerOnline {
            server_id,
            online_users: online.iter().map(PresenceUser::from).collect(),
            offline_users: offline.iter().map(PresenceUser::from).collect(),
        },
    );
    Ok(())
}

/// Send a full presence snapshot of a channel to its room, including
/// the permitted-user roster.
async fn broadcast_channel_presence(
    state: &AppState,
    server_id: i64,
    channel_id: i64,
) -> Result<(), AppError> {
    let users = state
        .member_service()
        .list_channel_users(server_id, channel_id)
        .await?;
    let permited_users: Vec<PresenceUser> = users.iter().map(PresenceUser::from).collect();
    let online_ids = state.gateway.online_user_ids(RoomKey::Channel(channel_id));
    let (online, offline) = partition_by_online(users, &online_ids, |m| m.user_id);

    state.gateway.send_to_room(
        RoomKey::Channel(channel_id),
        ServerEvent::ChannelOnline {
            server_id,
            channel_id,
            permited_users,
            online_users: online.iter().map(PresenceUser::from).collect(),
            offline_users: offline.iter().map(PresenceUser::from).collect(),
        },
    );
    Ok(())
}
