//! WebSocket Gateway
//!
//! In-memory registry of live connections and the rooms they joined.
//! Presence is derived from this registry alone, which makes it
//! process-scoped: running more than one gateway process would split
//! presence. A cross-process pub/sub layer is the documented path if
//! horizontal scaling is ever needed.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;

use super::messages::ServerEvent;
use crate::infrastructure::metrics;

/// A presence room: either a server lobby or a single channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoomKey {
    Server(i64),
    Channel(i64),
}

/// A live connection with its outbound message sender.
pub struct ConnectionHandle {
    pub user_id: i64,
    pub sender: mpsc::UnboundedSender<ServerEvent>,
}

/// Gateway managing all connections and room membership.
pub struct ChatGateway {
    /// Active connections by connection id.
    connections: DashMap<String, Arc<ConnectionHandle>>,
    /// User id to connection ids; one user may hold several sockets.
    user_connections: DashMap<i64, HashSet<String>>,
    /// Room to connection ids.
    rooms: DashMap<RoomKey, HashSet<String>>,
    /// Connection id to joined rooms, for cleanup on disconnect.
    connection_rooms: DashMap<String, HashSet<RoomKey>>,
}

impl ChatGateway {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            user_connections: DashMap::new(),
            rooms: DashMap::new(),
            connection_rooms: DashMap::new(),
        }
    }

    /// Register a new connection.
    pub fn register(
        &self,
        conn_id: String,
        user_id: i64,
        sender: mpsc::UnboundedSender<ServerEvent>,
    ) {
        self.connections
            .insert(conn_id.clone(), Arc::new(ConnectionHandle { user_id, sender }));
        self.user_connections
            .entry(user_id)
            .or_default()
            .insert(conn_id.clone());
        metrics::GATEWAY_CONNECTIONS_ACTIVE.inc();

        tracing::info!(user_id, conn_id = %conn_id, "Connection registered");
    }

    /// Drop a connection and return the rooms it was in, so each can get
    /// a fresh presence broadcast.
    pub fn unregister(&self, conn_id: &str) -> Vec<RoomKey> {
        let mut left_rooms = Vec::new();

        if let Some((_, rooms)) = self.connection_rooms.remove(conn_id) {
            for room in rooms {
                if let Some(mut members) = self.rooms.get_mut(&room) {
                    members.remove(conn_id);
                }
                self.rooms.remove_if(&room, |_, members| members.is_empty());
                left_rooms.push(room);
            }
        }

        if let Some((_, handle)) = self.connections.remove(conn_id) {
            if let Some(mut conns) = self.user_connections.get_mut(&handle.user_id) {
                conns.remove(conn_id);
            }
            self.user_connections
                .remove_if(&handle.user_id, |_, conns| conns.is_empty());
            metrics::GATEWAY_CONNECTIONS_ACTIVE.dec();
            tracing::info!(user_id = handle.user_id, conn_id = %conn_id, "Connection unregistered");
        }

        left_rooms
    }

    /// Join a room. Idempotent.
    pub fn join_room(&self, conn_id: &str, room: RoomKey) {
        self.rooms
            .entry(room)
            .or_default()
            .insert(conn_id.to_string());
        self.connection_rooms
            .entry(conn_id.to_string())
            .or_default()
            .insert(room);
    }

    /// Leave a room. Idempotent. Emptied entries are dropped so the maps
    /// stay bounded by live membership.
    pub fn leave_room(&self, conn_id: &str, room: RoomKey) {
        if let Some(mut members) = self.rooms.get_mut(&room) {
            members.remove(conn_id);
        }
        self.rooms.remove_if(&room, |_, members| members.is_empty());
        if let Some(mut rooms) = self.connection_rooms.get_mut(conn_id) {
            rooms.remove(&room);
        }
    }

    /// User ids with at least one live connection in the room.
    pub fn online_user_ids(&self, room: RoomKey) -> HashSet<i64> {
        let Some(members) = self.rooms.get(&room) else {
            return HashSet::new();
        };
        members
            .iter()
            .filter_map(|conn_id| self.connections.get(conn_id).map(|h| h.user_id))
            .collect()
    }

    /// The user behind a connection, if it is still registered.
    pub fn connection_user(&self, conn_id: &str) -> Option<i64> {
        self.connections.get(conn_id).map(|h| h.user_id)
    }

    /// Remove every connection of a user from a server room and the
    /// given channel rooms. Returns true when any membership was
    /// actually removed.
    pub fn evict_user_from_server(
        &self,
        user_id: i64,
        server_id: i64,
        channel_ids: &[i64],
    ) -> bool {
        let conn_ids: Vec<String> = self
            .user_connections
            .get(&user_id)
            .map(|conns| conns.iter().cloned().collect())
            .unwrap_or_default();

        let mut rooms = vec![RoomKey::Server(server_id)];
        rooms.extend(channel_ids.iter().map(|&id| RoomKey::Channel(id)));

        let mut evicted = false;
        for conn_id in &conn_ids {
            for &room in &rooms {
                let was_member = self
                    .rooms
                    .get(&room)
                    .map(|members| members.contains(conn_id))
                    .unwrap_or(false);
                if was_member {
                    self.leave_room(conn_id, room);
                    evicted = true;
                }
            }
        }
        evicted
    }

    /// Send an event to one connection.
    pub fn send_to_connection(&self, conn_id: &str, event: ServerEvent) -> bool {
        match self.connections.get(conn_id) {
            Some(handle) => handle.sender.send(event).is_ok(),
            None => false,
        }
    }

    /// Send an event to every connection of a user.
    pub fn send_to_user(&self, user_id: i64, event: ServerEvent) {
        if let Some(conn_ids) = self.user_connections.get(&user_id) {
            for conn_id in conn_ids.iter() {
                if let Some(handle) = self.connections.get(conn_id) {
                    let _ = handle.sender.send(event.clone());
                }
            }
        }
    }

    /// Send an event to every connection in a room.
    pub fn send_to_room(&self, room: RoomKey, event: ServerEvent) {
        if let Some(members) = self.rooms.get(&room) {
            for conn_id in members.iter() {
                if let Some(handle) = self.connections.get(conn_id) {
                    let _ = handle.sender.send(event.clone());
                }
            }
        }
    }

    /// Number of live connections.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

impl Default for ChatGateway {
    fn default() -> Self {
        Self::new()
    }
}
