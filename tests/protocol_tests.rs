//! Wire Protocol Tests
//!
//! Frame-level checks against the JSON the deployed clients send and
//! expect. Event names and field spellings here must never drift.

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use campaign_chat::application::services::{EnrichedMessage, HistoryPage};
use campaign_chat::domain::entities::{ChannelMessage, UserProfile, UserType};
use campaign_chat::presentation::websocket::{ClientEvent, PresenceUser, ServerEvent};

fn sample_message(id: i64) -> ChannelMessage {
    ChannelMessage {
        id,
        channel_id: 42,
        sender_id: 7,
        content: "hello".to_string(),
        pinned: false,
        created_at: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
    }
}

#[test]
fn test_client_events_deserialize_from_wire_frames() {
    let frame = r#"{"event": "server:open", "data": {"serverId": 123}}"#;
    match serde_json::from_str::<ClientEvent>(frame).unwrap() {
        ClientEvent::ServerOpen { server_id } => assert_eq!(server_id, 123),
        other => panic!("unexpected event: {:?}", other),
    }

    let frame = r#"{"event": "channel:open", "data": {"serverId": 1, "channelId": 2}}"#;
    match serde_json::from_str::<ClientEvent>(frame).unwrap() {
        ClientEvent::ChannelOpen {
            server_id,
            channel_id,
        } => {
            assert_eq!(server_id, 1);
            assert_eq!(channel_id, 2);
        }
        other => panic!("unexpected event: {:?}", other),
    }

    let frame = r#"{"event": "message:send", "data": {"channelId": 9, "content": "hi"}}"#;
    match serde_json::from_str::<ClientEvent>(frame).unwrap() {
        ClientEvent::MessageSend {
            channel_id,
            content,
        } => {
            assert_eq!(channel_id, 9);
            assert_eq!(content, "hi");
        }
        other => panic!("unexpected event: {:?}", other),
    }

    let frame = r#"{"event": "server:kick", "data": {"serverId": 5, "userId": 99}}"#;
    match serde_json::from_str::<ClientEvent>(frame).unwrap() {
        ClientEvent::ServerKick { server_id, user_id } => {
            assert_eq!(server_id, 5);
            assert_eq!(user_id, 99);
        }
        other => panic!("unexpected event: {:?}", other),
    }
}

#[test]
fn test_history_request_cursor_fields_are_optional() {
    let frame = r#"{"event": "message:history", "data": {"channelId": 4}}"#;
    match serde_json::from_str::<ClientEvent>(frame).unwrap() {
        ClientEvent::MessageHistory {
            channel_id,
            before_id,
            limit,
        } => {
            assert_eq!(channel_id, 4);
            assert_eq!(before_id, None);
            assert_eq!(limit, None);
        }
        other => panic!("unexpected event: {:?}", other),
    }

    let frame =
        r#"{"event": "message:history", "data": {"channelId": 4, "beforeId": 200, "limit": 25}}"#;
    match serde_json::from_str::<ClientEvent>(frame).unwrap() {
        ClientEvent::MessageHistory {
            before_id, limit, ..
        } => {
            assert_eq!(before_id, Some(200));
            assert_eq!(limit, Some(25));
        }
        other => panic!("unexpected event: {:?}", other),
    }
}

#[test]
fn test_unknown_event_name_is_rejected() {
    let frame = r#"{"event": "server:nuke", "data": {"serverId": 1}}"#;
    assert!(serde_json::from_str::<ClientEvent>(frame).is_err());
}

#[test]
fn test_channel_presence_frame_keeps_permited_users_spelling() {
    let user = PresenceUser {
        user_id: 7,
        display_name: Some("Mina".to_string()),
        avatar_url: None,
    };
    let event = ServerEvent::ChannelOnline {
        server_id: 1,
        channel_id: 2,
        permited_users: vec![user.clone()],
        online_users: vec![user],
        offline_users: vec![],
    };

    let value: Value = serde_json::to_value(&event).unwrap();
    assert_eq!(value["event"], "channel:online");
    let data = &value["data"];
    assert!(data.get("permitedUsers").is_some());
    assert!(data.get("permittedUsers").is_none());
    assert_eq!(data["permitedUsers"][0]["userId"], 7);
    assert_eq!(data["permitedUsers"][0]["displayName"], "Mina");
    assert_eq!(data["onlineUsers"].as_array().unwrap().len(), 1);
    assert_eq!(data["offlineUsers"].as_array().unwrap().len(), 0);
}

#[test]
fn test_message_frame_embeds_sender_profile() {
    let enriched = EnrichedMessage {
        message: sample_message(100),
        sender: Some(UserProfile {
            user_id: 7,
            email: "mina@example.com".to_string(),
            user_type: UserType::Creator,
            display_name: Some("Mina".to_string()),
            avatar_url: Some("https://cdn.example.com/7.png".to_string()),
        }),
    };
    let event = ServerEvent::Message(enriched.into());

    let value: Value = serde_json::to_value(&event).unwrap();
    assert_eq!(value["event"], "message");
    let data = &value["data"];
    assert_eq!(data["id"], 100);
    assert_eq!(data["channelId"], 42);
    assert_eq!(data["senderId"], 7);
    assert_eq!(data["content"], "hello");
    assert_eq!(data["pinned"], false);
    assert_eq!(data["sender"]["displayName"], "Mina");
}

#[test]
fn test_message_frame_omits_sender_when_profile_missing() {
    let enriched = EnrichedMessage {
        message: sample_message(101),
        sender: None,
    };
    let event = ServerEvent::Message(enriched.into());

    let value: Value = serde_json::to_value(&event).unwrap();
    assert!(value["data"].get("sender").is_none());
}

#[test]
fn test_history_page_frame_carries_cursor() {
    let page = HistoryPage {
        messages: vec![
            EnrichedMessage {
                message: sample_message(98),
                sender: None,
            },
            EnrichedMessage {
                message: sample_message(99),
                sender: None,
            },
        ],
        next_before_id: Some(98),
        has_more: true,
    };
    let event = ServerEvent::history_page(42, page);

    let value: Value = serde_json::to_value(&event).unwrap();
    assert_eq!(value["event"], "message:history");
    let data = &value["data"];
    assert_eq!(data["channelId"], 42);
    assert_eq!(data["nextBeforeId"], 98);
    assert_eq!(data["hasMore"], true);
    // Oldest first within a page
    assert_eq!(data["messages"][0]["id"], 98);
    assert_eq!(data["messages"][1]["id"], 99);
}

#[test]
fn test_error_and_ack_frames() {
    let value: Value = serde_json::to_value(&ServerEvent::Error {
        message: "Channel not found".to_string(),
    })
    .unwrap();
    assert_eq!(
        value,
        json!({"event": "error", "data": {"message": "Channel not found"}})
    );

    let value: Value = serde_json::to_value(&ServerEvent::MessageAck { id: 55 }).unwrap();
    assert_eq!(value, json!({"event": "message:ack", "data": {"id": 55}}));

    let value: Value =
        serde_json::to_value(&ServerEvent::Connected { user_id: 3 }).unwrap();
    assert_eq!(value, json!({"event": "connected", "data": {"userId": 3}}));
}

#[test]
fn test_kick_and_leave_frames() {
    let value: Value =
        serde_json::to_value(&ServerEvent::ServerKicked { server_id: 10 }).unwrap();
    assert_eq!(
        value,
        json!({"event": "server:kicked", "data": {"serverId": 10}})
    );

    let value: Value = serde_json::to_value(&ServerEvent::ServerKickOk {
        server_id: 10,
        user_id: 4,
    })
    .unwrap();
    assert_eq!(
        value,
        json!({"event": "server:kick:ok", "data": {"serverId": 10, "userId": 4}})
    );

    let value: Value =
        serde_json::to_value(&ServerEvent::ServerLeft { server_id: 10 }).unwrap();
    assert_eq!(
        value,
        json!({"event": "server:left", "data": {"serverId": 10}})
    );
}
