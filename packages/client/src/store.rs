//! Reactive chat state mutated by inbound realtime events.
//!
//! The store is a synchronous container; the session wraps it in a lock and
//! applies events as they arrive. Interested code registers an observer via
//! [`ChatStore::subscribe`] instead of polling.
//!
//! A `message received` push and the REST response for the same send are
//! independent sources of truth with no ordering guarantee between them, so
//! message insertion deduplicates by message id: whichever arrives second is
//! a no-op.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use tokio::sync::broadcast;

use buzzchat_shared::{MessagePayload, ServerEvent};

use crate::typing::TypingSet;

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Notification pushed to store observers on every effective mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreChange {
    MessageAdded(String),
    TypingStarted(String),
    TypingStopped(String),
    UserOnline(String),
    UserOffline(String),
    MessageRead(String),
}

/// Client-side view of the open chat: message list, typing set, online set.
pub struct ChatStore {
    self_user: String,
    messages: Vec<MessagePayload>,
    typing: TypingSet,
    online: HashSet<String>,
    changes: broadcast::Sender<StoreChange>,
}

impl ChatStore {
    pub fn new(self_user: impl Into<String>, typing_ttl: Duration) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            self_user: self_user.into(),
            messages: Vec::new(),
            typing: TypingSet::new(typing_ttl),
            online: HashSet::new(),
            changes,
        }
    }

    /// Register an observer for store mutations.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }

    /// Apply one inbound server event.
    ///
    /// Self-originated typing and presence echoes are filtered here by
    /// comparing the event's user id with the session's own.
    pub fn apply(&mut self, event: ServerEvent, now: Instant) {
        match event {
            ServerEvent::Connected => {
                tracing::info!("realtime connection acknowledged");
            }
            ServerEvent::MessageReceived(message) => {
                self.add_message(message);
            }
            ServerEvent::Typing(payload) => {
                if payload.user_id != self.self_user
                    && self.typing.insert(payload.user_id.clone(), now)
                {
                    self.notify(StoreChange::TypingStarted(payload.user_id));
                }
            }
            ServerEvent::StopTyping(payload) => {
                if self.typing.remove(&payload.user_id) {
                    self.notify(StoreChange::TypingStopped(payload.user_id));
                }
            }
            ServerEvent::UserOnline(payload) => {
                if payload.is_online
                    && payload.user_id != self.self_user
                    && self.online.insert(payload.user_id.clone())
                {
                    self.notify(StoreChange::UserOnline(payload.user_id));
                }
            }
            ServerEvent::UserOffline(payload) => {
                if !payload.is_online && self.online.remove(&payload.user_id) {
                    self.notify(StoreChange::UserOffline(payload.user_id));
                }
            }
            ServerEvent::MessageRead(message_id) => {
                self.notify(StoreChange::MessageRead(message_id));
            }
        }
    }

    /// Append a message unless one with the same id is already present.
    ///
    /// Both the realtime push and the REST response funnel through here, so
    /// the list ends with exactly one entry per id regardless of arrival
    /// order. Returns whether the message was added.
    pub fn add_message(&mut self, message: MessagePayload) -> bool {
        if self.messages.iter().any(|m| m.id == message.id) {
            tracing::debug!(message = %message.id, "duplicate message ignored");
            return false;
        }
        let id = message.id.clone();
        self.messages.push(message);
        self.notify(StoreChange::MessageAdded(id));
        true
    }

    /// Drop typing entries whose local deadline has passed, notifying
    /// observers for each. Called periodically by the session.
    pub fn expire_typing(&mut self, now: Instant) -> Vec<String> {
        let expired = self.typing.expire(now);
        for user in &expired {
            self.notify(StoreChange::TypingStopped(user.clone()));
        }
        expired
    }

    pub fn messages(&self) -> &[MessagePayload] {
        &self.messages
    }

    pub fn typing_users(&self, now: Instant) -> Vec<String> {
        self.typing.users(now)
    }

    pub fn online_users(&self) -> Vec<String> {
        let mut users: Vec<String> = self.online.iter().cloned().collect();
        users.sort();
        users
    }

    /// Reset per-chat state when switching chats. Presence is global and
    /// survives.
    pub fn clear_chat(&mut self) {
        self.messages.clear();
        self.typing.clear();
    }

    fn notify(&self, change: StoreChange) {
        // Nobody listening is fine; observers are optional.
        let _ = self.changes.send(change);
    }
}
