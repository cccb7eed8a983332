//! # Domain Entities
//!
//! Core domain entities for the campaign chat subsystem.
//! All entities map directly to their corresponding database tables.
//!
//! ## Core Entities
//!
//! - **ChatServer**: one chat server per campaign
//! - **ServerMember**: a user's membership (and role) in a server
//! - **Channel**: a public or private room within a server
//! - **ChannelMember**: explicit membership of a private channel
//! - **ServerInvite**: pending/accepted/declined invitation of a creator
//! - **ChannelMessage**: immutable message with a pin flag
//!
//! ## External collaborator projections
//!
//! - **UserProfile** / **UserType**: identity + display info, read-only
//! - **CampaignRepository**: ownership/participation facts, read-only
//!
//! ## Repository Traits
//!
//! Each entity has an associated repository trait defining data access
//! operations, implemented in the infrastructure layer.

mod campaign;
mod channel;
mod invite;
mod member;
mod message;
mod server;
mod user;

pub use campaign::CampaignRepository;
pub use channel::{Channel, ChannelMember, ChannelRepository, ChannelState};
pub use invite::{InviteRepository, InviteStatus, ServerInvite};
pub use member::{MemberRepository, MemberRole, ServerMember};
pub use message::{ChannelMessage, MessageRepository};
pub use server::{ChatServer, ServerRepository};
pub use user::{ProfileRepository, UserProfile, UserType};

#[cfg(test)]
pub use campaign::MockCampaignRepository;
#[cfg(test)]
pub use channel::MockChannelRepository;
#[cfg(test)]
pub use invite::MockInviteRepository;
#[cfg(test)]
pub use member::MockMemberRepository;
#[cfg(test)]
pub use message::MockMessageRepository;
#[cfg(test)]
pub use server::MockServerRepository;
#[cfg(test)]
pub use user::MockProfileRepository;
