//! WebSocket Gateway
//!
//! Real-time communication via WebSocket connections.

pub mod events;
pub mod gateway;
pub mod handler;
pub mod messages;

pub use gateway::{ChatGateway, RoomKey};
pub use handler::ws_handler;
pub use messages::{ClientEvent, MessagePayload, PresenceUser, ServerEvent};
