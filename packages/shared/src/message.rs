//! Message payload structs matching the REST message shape.
//!
//! Field names mirror the persisted message document (`_id`, `fileUrl`,
//! `createdAt`) so that a message arriving over the realtime channel and the
//! same message arriving in a REST response deserialize identically and can
//! be deduplicated by id on the client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Summary of a user as embedded in message and chat payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UserSummary {
    /// Minimal summary with just an id and display name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            avatar: None,
            email: None,
        }
    }
}

/// Summary of the chat a message belongs to, including its member list.
///
/// `users` defaults to empty when absent on the wire; the router treats an
/// empty member list as a malformed message and drops the event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSummary {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub users: Vec<UserSummary>,
}

/// A fully populated chat message as produced by the message store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePayload {
    #[serde(rename = "_id")]
    pub id: String,
    pub content: String,
    #[serde(rename = "fileUrl", default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    pub sender: UserSummary,
    pub chat: ChatSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_message() -> MessagePayload {
        MessagePayload {
            id: "m1".to_string(),
            content: "hello".to_string(),
            file_url: None,
            created_at: "2024-05-01T12:00:00Z".parse().unwrap(),
            sender: UserSummary::new("u1", "alice"),
            chat: ChatSummary {
                id: "c1".to_string(),
                users: vec![UserSummary::new("u1", "alice"), UserSummary::new("u2", "bob")],
            },
        }
    }

    #[test]
    fn test_message_serializes_with_store_field_names() {
        // given:
        let message = sample_message();

        // when:
        let json = serde_json::to_value(&message).unwrap();

        // then:
        assert_eq!(json["_id"], "m1");
        assert_eq!(json["createdAt"], "2024-05-01T12:00:00Z");
        assert_eq!(json["chat"]["_id"], "c1");
        assert_eq!(json["chat"]["users"][1]["_id"], "u2");
        // absent optionals are omitted, matching the REST response
        assert!(json.get("fileUrl").is_none());
        assert!(json["sender"].get("avatar").is_none());
    }

    #[test]
    fn test_message_without_chat_users_deserializes_to_empty_list() {
        // given: a payload whose chat carries no member list
        let json = r#"{
            "_id": "m2",
            "content": "hi",
            "createdAt": "2024-05-01T12:00:00Z",
            "sender": {"_id": "u1", "name": "alice"},
            "chat": {"_id": "c1"}
        }"#;

        // when:
        let message: MessagePayload = serde_json::from_str(json).unwrap();

        // then: parsing succeeds, the router decides what to do with it
        assert!(message.chat.users.is_empty());
    }

    #[test]
    fn test_message_roundtrip_preserves_file_url() {
        // given:
        let mut message = sample_message();
        message.file_url = Some("https://cdn.example/f.png".to_string());

        // when:
        let json = serde_json::to_string(&message).unwrap();
        let back: MessagePayload = serde_json::from_str(&json).unwrap();

        // then:
        assert_eq!(back, message);
        assert!(json.contains("\"fileUrl\""));
    }
}
