//! Value Objects for the realtime domain.
//!
//! Value Objects are immutable and compared by value, not identity. Ids
//! arriving over the wire are opaque strings minted by the external stores;
//! validation here only rejects the degenerate cases (empty, absurdly long)
//! so that malformed events can be dropped at the router boundary.

use std::fmt;

use uuid::Uuid;

use super::error::ValueObjectError;

const MAX_ID_LEN: usize = 100;

/// User identifier value object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: String) -> Result<Self, ValueObjectError> {
        if id.is_empty() {
            return Err(ValueObjectError::UserIdEmpty);
        }
        let len = id.len();
        if len > MAX_ID_LEN {
            return Err(ValueObjectError::UserIdTooLong {
                max: MAX_ID_LEN,
                actual: len,
            });
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = ValueObjectError;

    fn try_from(id: String) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Chat identifier value object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChatId(String);

impl ChatId {
    pub fn new(id: String) -> Result<Self, ValueObjectError> {
        if id.is_empty() {
            return Err(ValueObjectError::ChatIdEmpty);
        }
        let len = id.len();
        if len > MAX_ID_LEN {
            return Err(ValueObjectError::ChatIdTooLong {
                max: MAX_ID_LEN,
                actual: len,
            });
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for ChatId {
    type Error = ValueObjectError;

    fn try_from(id: String) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ephemeral identity of one live transport socket.
///
/// Minted server-side on connect, never reused. Destroyed with the
/// connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A broadcast group identity.
///
/// Personal rooms (joined at `setup`) and chat rooms (joined via `join
/// chat`) share one membership table; the tag keeps a user id from ever
/// colliding with a chat id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RoomKey {
    User(UserId),
    Chat(ChatId),
}

impl fmt::Display for RoomKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(id) => write!(f, "user:{}", id),
            Self::Chat(id) => write!(f, "chat:{}", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_new_success() {
        // given:
        let id = "u1".to_string();

        // when:
        let result = UserId::new(id);

        // then:
        assert!(result.is_ok());
        assert_eq!(result.unwrap().as_str(), "u1");
    }

    #[test]
    fn test_user_id_new_empty_fails() {
        // given:
        let id = "".to_string();

        // when:
        let result = UserId::new(id);

        // then:
        assert_eq!(result.unwrap_err(), ValueObjectError::UserIdEmpty);
    }

    #[test]
    fn test_user_id_new_too_long_fails() {
        // given:
        let id = "a".repeat(101);

        // when:
        let result = UserId::new(id);

        // then:
        assert_eq!(
            result.unwrap_err(),
            ValueObjectError::UserIdTooLong {
                max: 100,
                actual: 101
            }
        );
    }

    #[test]
    fn test_chat_id_new_empty_fails() {
        // given:
        let id = "".to_string();

        // when:
        let result = ChatId::new(id);

        // then:
        assert_eq!(result.unwrap_err(), ValueObjectError::ChatIdEmpty);
    }

    #[test]
    fn test_connection_ids_are_unique() {
        // given / when:
        let a = ConnectionId::new();
        let b = ConnectionId::new();

        // then:
        assert_ne!(a, b);
    }

    #[test]
    fn test_room_key_user_and_chat_never_collide() {
        // given: a user id and a chat id with the same raw string
        let user_room = RoomKey::User(UserId::new("same".to_string()).unwrap());
        let chat_room = RoomKey::Chat(ChatId::new("same".to_string()).unwrap());

        // then:
        assert_ne!(user_room, chat_room);
    }
}
