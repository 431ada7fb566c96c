//! Client/server realtime events as closed tagged enums.
//!
//! The wire envelope is `{"event": <name>, "data": <payload>}` with the
//! historical event names kept verbatim (some contain spaces). Modeling the
//! channel as two exhaustive enums means an unknown or malformed event fails
//! at the deserialization boundary and every handler match is checked at
//! compile time.

use serde::{Deserialize, Serialize};

use crate::message::MessagePayload;

/// Typing indicator payload, relayed unchanged between peers of a chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingPayload {
    pub chat_id: String,
    pub user_id: String,
}

/// Online/offline broadcast payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresencePayload {
    pub user_id: String,
    pub is_online: bool,
}

/// Events a client sends to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    /// Identify this connection. The only connection-level state
    /// transition; there is no way to un-identify short of disconnecting.
    #[serde(rename = "setup")]
    Setup(String),
    /// Subscribe to a chat room's typing/broadcast traffic.
    #[serde(rename = "join chat")]
    JoinChat(String),
    /// Announce a message already persisted via the REST path.
    #[serde(rename = "new message")]
    NewMessage(MessagePayload),
    #[serde(rename = "typing")]
    Typing(TypingPayload),
    #[serde(rename = "stop typing")]
    StopTyping(TypingPayload),
    /// Announce that the given message id has been read.
    #[serde(rename = "message read")]
    MessageRead(String),
}

/// Events the server pushes to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// Acknowledges `setup`, sent to the caller only.
    #[serde(rename = "connected")]
    Connected,
    #[serde(rename = "message received")]
    MessageReceived(MessagePayload),
    #[serde(rename = "typing")]
    Typing(TypingPayload),
    #[serde(rename = "stop typing")]
    StopTyping(TypingPayload),
    #[serde(rename = "user-online")]
    UserOnline(PresencePayload),
    #[serde(rename = "user-offline")]
    UserOffline(PresencePayload),
    #[serde(rename = "message-read")]
    MessageRead(String),
}
