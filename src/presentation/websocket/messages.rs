//! WebSocket Wire Protocol
//!
//! Every frame is a JSON object `{"event": "...", "data": {...}}`.
//! Event names and field spellings are fixed by the existing clients,
//! including the historical `permitedUsers` spelling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::services::{EnrichedMessage, HistoryPage, MemberView};

/// Client-to-server events.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    #[serde(rename = "server:open", rename_all = "camelCase")]
    ServerOpen { server_id: i64 },

    #[serde(rename = "server:close", rename_all = "camelCase")]
    ServerClose { server_id: i64 },

    #[serde(rename = "server:leave", rename_all = "camelCase")]
    ServerLeave { server_id: i64 },

    #[serde(rename = "server:kick", rename_all = "camelCase")]
    ServerKick { server_id: i64, user_id: i64 },

    #[serde(rename = "channel:open", rename_all = "camelCase")]
    ChannelOpen { server_id: i64, channel_id: i64 },

    #[serde(rename = "channel:close", rename_all = "camelCase")]
    ChannelClose { server_id: i64, channel_id: i64 },

    #[serde(rename = "message:send", rename_all = "camelCase")]
    MessageSend { channel_id: i64, content: String },

    #[serde(rename = "message:history", rename_all = "camelCase")]
    MessageHistory {
        channel_id: i64,
        #[serde(default)]
        before_id: Option<i64>,
        #[serde(default)]
        limit: Option<i64>,
    },

    #[serde(rename = "message:pin", rename_all = "camelCase")]
    MessagePin {
        channel_id: i64,
        message_id: i64,
        pinned: bool,
    },
}

impl ClientEvent {
    /// Wire name, used for metrics labels.
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::ServerOpen { .. } => "server:open",
            ClientEvent::ServerClose { .. } => "server:close",
            ClientEvent::ServerLeave { .. } => "server:leave",
            ClientEvent::ServerKick { .. } => "server:kick",
            ClientEvent::ChannelOpen { .. } => "channel:open",
            ClientEvent::ChannelClose { .. } => "channel:close",
            ClientEvent::MessageSend { .. } => "message:send",
            ClientEvent::MessageHistory { .. } => "message:history",
            ClientEvent::MessagePin { .. } => "message:pin",
        }
    }
}

/// Server-to-client events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    #[serde(rename = "connected", rename_all = "camelCase")]
    Connected { user_id: i64 },

    #[serde(rename = "error")]
    Error { message: String },

    #[serde(rename = "joined", rename_all = "camelCase")]
    Joined { channel_id: i64 },

    #[serde(rename = "left", rename_all = "camelCase")]
    Left { channel_id: i64 },

    #[serde(rename = "server:online", rename_all = "camelCase")]
    ServerOnline {
        server_id: i64,
        online_users: Vec<PresenceUser>,
        offline_users: Vec<PresenceUser>,
    },

    #[serde(rename = "channel:online", rename_all = "camelCase")]
    ChannelOnline {
        server_id: i64,
        channel_id: i64,
        #[serde(rename = "permitedUsers")]
        permited_users: Vec<PresenceUser>,
        online_users: Vec<PresenceUser>,
        offline_users: Vec<PresenceUser>,
    },

    #[serde(rename = "message")]
    Message(MessagePayload),

    #[serde(rename = "message:ack")]
    MessageAck { id: i64 },

    #[serde(rename = "message:history", rename_all = "camelCase")]
    MessageHistoryPage {
        channel_id: i64,
        messages: Vec<MessagePayload>,
        next_before_id: Option<i64>,
        has_more: bool,
    },

    #[serde(rename = "message:pinned")]
    MessagePinned(MessagePayload),

    #[serde(rename = "message:pin:ok", rename_all = "camelCase")]
    MessagePinOk { message_id: i64, pinned: bool },

    #[serde(rename = "server:left", rename_all = "camelCase")]
    ServerLeft { server_id: i64 },

    #[serde(rename = "server:kicked", rename_all = "camelCase")]
    ServerKicked { server_id: i64 },

    #[serde(rename = "server:kick:ok", rename_all = "camelCase")]
    ServerKickOk { server_id: i64, user_id: i64 },
}

/// A user entry in presence snapshots.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceUser {
    pub user_id: i64,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl From<&MemberView> for PresenceUser {
    fn from(view: &MemberView) -> Self {
        Self {
            user_id: view.user_id,
            display_name: view.display_name.clone(),
            avatar_url: view.avatar_url.clone(),
        }
    }
}

/// Sender display info embedded in message frames.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SenderInfo {
    pub user_id: i64,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// A message as delivered over the wire.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePayload {
    pub id: i64,
    pub channel_id: i64,
    pub sender_id: i64,
    pub content: String,
    pub pinned: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<SenderInfo>,
}

impl From<EnrichedMessage> for MessagePayload {
    fn from(enriched: EnrichedMessage) -> Self {
        let sender = enriched.sender.map(|p| SenderInfo {
            user_id: p.user_id,
            display_name: p.display_name,
            avatar_url: p.avatar_url,
        });
        Self {
            id: enriched.message.id,
            channel_id: enriched.message.channel_id,
            sender_id: enriched.message.sender_id,
            content: enriched.message.content,
            pinned: enriched.message.pinned,
            created_at: enriched.message.created_at,
            sender,
        }
    }
}

impl ServerEvent {
    /// Build the history frame for one page.
    pub fn history_page(channel_id: i64, page: HistoryPage) -> Self {
        ServerEvent::MessageHistoryPage {
            channel_id,
            messages: page.messages.into_iter().map(MessagePayload::from).collect(),
            next_before_id: page.next_before_id,
            has_more: page.has_more,
        }
    }
}
