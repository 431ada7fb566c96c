//! Shared realtime contract for the BuzzChat application.
//!
//! This crate defines the wire format spoken between the server's event
//! router and the client realtime adapter: the closed event enums and the
//! payload structs they carry. Both sides depend on this crate so the
//! realtime push and the REST response stay structurally identical.

pub mod event;
pub mod message;

pub use event::{ClientEvent, PresencePayload, ServerEvent, TypingPayload};
pub use message::{ChatSummary, MessagePayload, UserSummary};
