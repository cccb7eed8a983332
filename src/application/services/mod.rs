//! Application Services
//!
//! Business logic services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **AccessService**: Server and channel visibility decisions
//! - **ServerService**: Chat server provisioning and administration
//! - **MemberService**: Channel membership and server membership lifecycle
//! - **InviteService**: Server invite state machine
//! - **ChannelService**: Channel CRUD and visibility-filtered listing
//! - **MessageService**: Message persistence, history, and pinning

pub mod access_service;
pub mod server_service;
pub mod member_service;
pub mod invite_service;
pub mod channel_service;
pub mod message_service;

pub use access_service::{AccessService, AccessServiceImpl};

pub use server_service::{ServerService, ServerServiceImpl};

pub use member_service::{BulkAddOutcome, MemberService, MemberServiceImpl, MemberView};

pub use invite_service::{
    InviteAction, InviteBatchOutcome, InviteService, InviteServiceImpl, InviteView,
};

pub use channel_service::{
    ChannelService, ChannelServiceImpl, CreateChannelDto, CreatedChannel, UpdateChannelDto,
};

pub use message_service::{
    EnrichedMessage, HistoryPage, MessageService, MessageServiceImpl, DEFAULT_HISTORY_LIMIT,
    MAX_HISTORY_LIMIT,
};
