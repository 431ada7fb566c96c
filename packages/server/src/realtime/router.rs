//! Event router: dispatches inbound events and computes fan-out targets.
//!
//! The router owns the presence registry, the room membership table and the
//! per-connection identity. `handle` and `disconnect` are synchronous and run
//! to completion per event, so the surrounding lock provides all the mutual
//! exclusion the tables need. Every handler is best-effort: malformed input
//! is logged and dropped, nothing is ever surfaced back to the sender.

use std::collections::HashMap;
use std::time::Instant;

use buzzchat_shared::{ClientEvent, PresencePayload, ServerEvent, TypingPayload};

use crate::config::{MessageRouting, RouterConfig};
use crate::domain::{ChatId, ConnectionId, RoomKey, UserId};

use super::{PresenceRegistry, RoomMembership, TypingTracker};

/// One outbound event addressed to one connection. The transport layer
/// performs the send, fire-and-forget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub to: ConnectionId,
    pub event: ServerEvent,
}

/// Per-connection state machine plus fan-out computation.
///
/// A connection is Anonymous until its `setup` event and Identified after;
/// there is no reverse transition short of disconnecting. The identity is
/// retained here per connection rather than re-derived from the presence
/// registry, because the registry entry may already belong to a newer
/// connection of the same user by the time this one disconnects.
pub struct EventRouter {
    presence: PresenceRegistry,
    rooms: RoomMembership,
    typing: TypingTracker,
    connections: HashMap<ConnectionId, Option<UserId>>,
    config: RouterConfig,
}

impl EventRouter {
    pub fn new(config: RouterConfig) -> Self {
        Self::with_parts(PresenceRegistry::new(), RoomMembership::new(), config)
    }

    /// Build a router around externally constructed registries. Used by
    /// tests that want to inspect or pre-seed the tables.
    pub fn with_parts(
        presence: PresenceRegistry,
        rooms: RoomMembership,
        config: RouterConfig,
    ) -> Self {
        Self {
            presence,
            rooms,
            typing: TypingTracker::new(config.typing_sweep_ttl),
            connections: HashMap::new(),
            config,
        }
    }

    /// Register a freshly accepted transport connection (Anonymous state).
    pub fn register(&mut self, conn: ConnectionId) {
        self.connections.insert(conn, None);
    }

    /// Process one inbound event and return the deliveries it implies.
    pub fn handle(&mut self, conn: ConnectionId, event: ClientEvent, now: Instant) -> Vec<Delivery> {
        match event {
            ClientEvent::Setup(user_id) => self.handle_setup(conn, user_id),
            ClientEvent::JoinChat(chat_id) => self.handle_join_chat(conn, chat_id),
            ClientEvent::NewMessage(message) => self.handle_new_message(conn, message),
            ClientEvent::Typing(payload) => self.handle_typing(conn, payload, now),
            ClientEvent::StopTyping(payload) => self.handle_stop_typing(conn, payload),
            // Read receipts go to every connection, the reader included.
            ClientEvent::MessageRead(message_id) => {
                self.broadcast_to_all(ServerEvent::MessageRead(message_id))
            }
        }
    }

    fn handle_setup(&mut self, conn: ConnectionId, user_id: String) -> Vec<Delivery> {
        let user = match UserId::new(user_id) {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(connection = %conn, "Dropping setup with invalid user id: {}", e);
                return Vec::new();
            }
        };

        self.connections.insert(conn, Some(user.clone()));
        if let Some(replaced) = self.presence.set_online(user.clone(), conn) {
            tracing::debug!(
                user = %user,
                superseded = %replaced,
                current = %conn,
                "presence entry replaced, last socket wins"
            );
        }
        self.rooms.join(conn, RoomKey::User(user.clone()));
        tracing::info!(user = %user, connection = %conn, "user identified");

        let mut deliveries = vec![Delivery {
            to: conn,
            event: ServerEvent::Connected,
        }];
        let online = ServerEvent::UserOnline(PresencePayload {
            user_id: user.into_string(),
            is_online: true,
        });
        deliveries.extend(self.broadcast_to_all_except(conn, online));
        deliveries
    }

    fn handle_join_chat(&mut self, conn: ConnectionId, chat_id: String) -> Vec<Delivery> {
        let chat = match ChatId::new(chat_id) {
            Ok(chat) => chat,
            Err(e) => {
                tracing::warn!(connection = %conn, "Dropping join chat with invalid chat id: {}", e);
                return Vec::new();
            }
        };

        if matches!(self.connections.get(&conn), Some(None) | None) {
            // Tolerated, but such a connection will miss personal-room pushes
            // until it runs setup.
            tracing::debug!(connection = %conn, chat = %chat, "anonymous connection joined chat");
        }
        self.rooms.join(conn, RoomKey::Chat(chat));
        Vec::new()
    }

    fn handle_new_message(
        &mut self,
        conn: ConnectionId,
        message: buzzchat_shared::MessagePayload,
    ) -> Vec<Delivery> {
        if message.chat.users.is_empty() {
            tracing::warn!(
                connection = %conn,
                message = %message.id,
                "new message has no chat users, dropping"
            );
            return Vec::new();
        }

        let event = ServerEvent::MessageReceived(message.clone());
        match self.config.message_routing {
            MessageRouting::PersonalRooms => {
                let mut deliveries = Vec::new();
                for recipient in &message.chat.users {
                    if recipient.id == message.sender.id {
                        continue;
                    }
                    let user = match UserId::new(recipient.id.clone()) {
                        Ok(user) => user,
                        Err(e) => {
                            tracing::debug!("skipping recipient with invalid id: {}", e);
                            continue;
                        }
                    };
                    // Offline recipient: empty personal room, silently skipped.
                    for to in self.rooms.members_of(&RoomKey::User(user)) {
                        if to != conn {
                            deliveries.push(Delivery {
                                to,
                                event: event.clone(),
                            });
                        }
                    }
                }
                deliveries
            }
            MessageRouting::ChatRoom => {
                let chat = match ChatId::new(message.chat.id.clone()) {
                    Ok(chat) => chat,
                    Err(e) => {
                        tracing::warn!(connection = %conn, "new message has invalid chat id: {}", e);
                        return Vec::new();
                    }
                };
                self.broadcast_to_room(&RoomKey::Chat(chat), event, Some(conn))
            }
        }
    }

    fn handle_typing(
        &mut self,
        conn: ConnectionId,
        payload: TypingPayload,
        now: Instant,
    ) -> Vec<Delivery> {
        let chat = match ChatId::new(payload.chat_id.clone()) {
            Ok(chat) => chat,
            Err(e) => {
                tracing::warn!(connection = %conn, "Dropping typing with invalid chat id: {}", e);
                return Vec::new();
            }
        };
        if let Ok(user) = UserId::new(payload.user_id.clone()) {
            self.typing.record(chat.clone(), user, now);
        }
        self.broadcast_to_room(&RoomKey::Chat(chat), ServerEvent::Typing(payload), Some(conn))
    }

    fn handle_stop_typing(&mut self, conn: ConnectionId, payload: TypingPayload) -> Vec<Delivery> {
        let chat = match ChatId::new(payload.chat_id.clone()) {
            Ok(chat) => chat,
            Err(e) => {
                tracing::warn!(connection = %conn, "Dropping stop typing with invalid chat id: {}", e);
                return Vec::new();
            }
        };
        if let Ok(user) = UserId::new(payload.user_id.clone()) {
            self.typing.clear(&chat, &user);
        }
        self.broadcast_to_room(
            &RoomKey::Chat(chat),
            ServerEvent::StopTyping(payload),
            Some(conn),
        )
    }

    /// Tear down a connection. Idempotent: a double-fired disconnect finds
    /// no connection entry and returns no deliveries.
    pub fn disconnect(&mut self, conn: ConnectionId) -> Vec<Delivery> {
        let Some(identity) = self.connections.remove(&conn) else {
            return Vec::new();
        };
        self.rooms.leave_all(conn);

        let Some(user) = identity else {
            tracing::debug!(connection = %conn, "anonymous connection closed");
            return Vec::new();
        };

        if !self.presence.remove_if_current(&user, conn) {
            // A newer connection for this user has taken over the presence
            // entry; this stale disconnect must not mark them offline.
            tracing::debug!(user = %user, connection = %conn, "stale disconnect ignored");
            return Vec::new();
        }
        tracing::info!(user = %user, connection = %conn, "user went offline");

        let mut deliveries = Vec::new();
        // Clear any typing indicators the departed user left behind before
        // announcing the offline transition.
        for chat in self.typing.remove_user(&user) {
            let payload = TypingPayload {
                chat_id: chat.as_str().to_string(),
                user_id: user.as_str().to_string(),
            };
            deliveries.extend(self.broadcast_to_room(
                &RoomKey::Chat(chat),
                ServerEvent::StopTyping(payload),
                None,
            ));
        }
        let offline = ServerEvent::UserOffline(PresencePayload {
            user_id: user.into_string(),
            is_online: false,
        });
        deliveries.extend(self.broadcast_to_all_except(conn, offline));
        deliveries
    }

    /// Expire typing entries older than the configured TTL, emitting a
    /// synthetic `stop typing` to each affected chat room. No-op unless a
    /// sweep TTL is configured.
    pub fn sweep_typing(&mut self, now: Instant) -> Vec<Delivery> {
        let mut deliveries = Vec::new();
        for (chat, user) in self.typing.sweep(now) {
            tracing::debug!(user = %user, chat = %chat, "typing indicator expired server-side");
            let exclude = self.presence.connection_id_for(&user);
            let payload = TypingPayload {
                chat_id: chat.as_str().to_string(),
                user_id: user.into_string(),
            };
            deliveries.extend(self.broadcast_to_room(
                &RoomKey::Chat(chat),
                ServerEvent::StopTyping(payload),
                exclude,
            ));
        }
        deliveries
    }

    /// Snapshot of online user ids for the presence endpoint.
    pub fn online_users(&self) -> Vec<String> {
        self.presence
            .online_users()
            .into_iter()
            .map(UserId::into_string)
            .collect()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    fn broadcast_to_room(
        &self,
        room: &RoomKey,
        event: ServerEvent,
        exclude: Option<ConnectionId>,
    ) -> Vec<Delivery> {
        self.rooms
            .members_of(room)
            .into_iter()
            .filter(|to| Some(*to) != exclude)
            .map(|to| Delivery {
                to,
                event: event.clone(),
            })
            .collect()
    }

    fn broadcast_to_all(&self, event: ServerEvent) -> Vec<Delivery> {
        self.connections
            .keys()
            .map(|to| Delivery {
                to: *to,
                event: event.clone(),
            })
            .collect()
    }

    fn broadcast_to_all_except(&self, exclude: ConnectionId, event: ServerEvent) -> Vec<Delivery> {
        self.connections
            .keys()
            .filter(|to| **to != exclude)
            .map(|to| Delivery {
                to: *to,
                event: event.clone(),
            })
            .collect()
    }
}
