//! Data Transfer Objects
//!
//! DTOs for API request/response serialization.

pub mod request;
pub mod response;

pub use request::{
    AddMembersRequest, CreateChannelRequest, CreateInvitesRequest, RenameServerRequest,
    RespondInviteRequest, UpdateChannelRequest,
};
pub use response::{
    AddMembersResponse, ChannelResponse, CreateChannelResponse, InvitableUserResponse,
    InviteBatchResponse, InviteResponse, MemberResponse, ServerResponse,
};
