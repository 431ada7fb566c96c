//! Server-side typing indicator bookkeeping.
//!
//! Only active when a sweep TTL is configured. Tracks the last `typing`
//! instant per `(chat, user)` so the server can emit a synthetic `stop
//! typing` when a peer goes silent or disconnects without one. With no TTL
//! configured this tracker stays empty and expiry is purely client-local.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::domain::{ChatId, UserId};

#[derive(Debug, Default)]
pub struct TypingTracker {
    entries: HashMap<(ChatId, UserId), Instant>,
    ttl: Option<Duration>,
}

impl TypingTracker {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    pub fn enabled(&self) -> bool {
        self.ttl.is_some()
    }

    /// Record a `typing` event. Refreshes the deadline on repeat keystrokes.
    pub fn record(&mut self, chat: ChatId, user: UserId, now: Instant) {
        if self.ttl.is_some() {
            self.entries.insert((chat, user), now);
        }
    }

    /// Clear one entry on an explicit `stop typing`.
    pub fn clear(&mut self, chat: &ChatId, user: &UserId) {
        self.entries
            .retain(|(c, u), _| !(c == chat && u == user));
    }

    /// Drop every entry for `user`, returning the chats that still believed
    /// the user was typing. Used when the user's connection goes away.
    pub fn remove_user(&mut self, user: &UserId) -> Vec<ChatId> {
        let mut chats: Vec<ChatId> = self
            .entries
            .keys()
            .filter(|(_, u)| u == user)
            .map(|(c, _)| c.clone())
            .collect();
        self.entries.retain(|(_, u), _| u != user);
        chats.sort();
        chats
    }

    /// Remove and return every entry older than the TTL.
    pub fn sweep(&mut self, now: Instant) -> Vec<(ChatId, UserId)> {
        let Some(ttl) = self.ttl else {
            return Vec::new();
        };
        let mut expired: Vec<(ChatId, UserId)> = self
            .entries
            .iter()
            .filter(|(_, last)| now.duration_since(**last) >= ttl)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            self.entries.remove(key);
        }
        expired.sort();
        expired
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chat(id: &str) -> ChatId {
        ChatId::new(id.to_string()).unwrap()
    }

    fn user(id: &str) -> UserId {
        UserId::new(id.to_string()).unwrap()
    }

    const TTL: Duration = Duration::from_secs(5);

    #[test]
    fn test_disabled_tracker_records_nothing() {
        // given: no sweep TTL configured
        let mut tracker = TypingTracker::new(None);

        // when:
        tracker.record(chat("c1"), user("u1"), Instant::now());

        // then:
        assert!(!tracker.enabled());
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_sweep_expires_stale_entries_only() {
        // given: one stale and one fresh typing entry
        let mut tracker = TypingTracker::new(Some(TTL));
        let start = Instant::now();
        tracker.record(chat("c1"), user("u1"), start);
        tracker.record(chat("c2"), user("u2"), start + Duration::from_secs(4));

        // when: sweeping just past u1's deadline
        let expired = tracker.sweep(start + TTL);

        // then:
        assert_eq!(expired, vec![(chat("c1"), user("u1"))]);
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_record_refreshes_deadline() {
        // given: a keystroke restarts the countdown
        let mut tracker = TypingTracker::new(Some(TTL));
        let start = Instant::now();
        tracker.record(chat("c1"), user("u1"), start);
        tracker.record(chat("c1"), user("u1"), start + Duration::from_secs(4));

        // when: sweeping at the original deadline
        let expired = tracker.sweep(start + TTL);

        // then: the refreshed entry survives
        assert!(expired.is_empty());
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_clear_removes_entry() {
        // given:
        let mut tracker = TypingTracker::new(Some(TTL));
        tracker.record(chat("c1"), user("u1"), Instant::now());

        // when:
        tracker.clear(&chat("c1"), &user("u1"));

        // then:
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_remove_user_returns_affected_chats() {
        // given: u1 typing in two chats, u2 in one
        let mut tracker = TypingTracker::new(Some(TTL));
        let now = Instant::now();
        tracker.record(chat("c1"), user("u1"), now);
        tracker.record(chat("c2"), user("u1"), now);
        tracker.record(chat("c1"), user("u2"), now);

        // when:
        let chats = tracker.remove_user(&user("u1"));

        // then:
        assert_eq!(chats, vec![chat("c1"), chat("c2")]);
        assert_eq!(tracker.len(), 1);
    }
}
