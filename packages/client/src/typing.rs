//! Typing indicator primitives, both directions.
//!
//! [`TypingSet`] is the receiving side: who is typing in the open chat.
//! Entries expire on a local deadline even if the peer never sends `stop
//! typing`, which bounds staleness when a peer disconnects uncleanly.
//! [`TypingDebounce`] is the sending side: emit `typing` on the first
//! keystroke, `stop typing` after a fixed quiet period, restarted on every
//! keystroke and canceled on send.
//!
//! Both are pure state machines over an injected `Instant` so tests never
//! sleep.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Set of users currently typing, each with an expiry deadline.
#[derive(Debug)]
pub struct TypingSet {
    deadlines: HashMap<String, Instant>,
    ttl: Duration,
}

impl TypingSet {
    pub fn new(ttl: Duration) -> Self {
        Self {
            deadlines: HashMap::new(),
            ttl,
        }
    }

    /// Mark `user` as typing. Returns true if the user was not already in
    /// the set; a repeat refreshes the deadline.
    pub fn insert(&mut self, user: String, now: Instant) -> bool {
        self.deadlines.insert(user, now + self.ttl).is_none()
    }

    /// Remove `user` on an explicit `stop typing`. Returns whether the user
    /// was present.
    pub fn remove(&mut self, user: &str) -> bool {
        self.deadlines.remove(user).is_some()
    }

    /// Remove and return every user whose deadline has passed.
    pub fn expire(&mut self, now: Instant) -> Vec<String> {
        let mut expired: Vec<String> = self
            .deadlines
            .iter()
            .filter(|(_, deadline)| now >= **deadline)
            .map(|(user, _)| user.clone())
            .collect();
        for user in &expired {
            self.deadlines.remove(user);
        }
        expired.sort();
        expired
    }

    /// Users typing as of `now`, sorted. Entries past their deadline are
    /// hidden even before the next sweep removes them.
    pub fn users(&self, now: Instant) -> Vec<String> {
        let mut users: Vec<String> = self
            .deadlines
            .iter()
            .filter(|(_, deadline)| now < **deadline)
            .map(|(user, _)| user.clone())
            .collect();
        users.sort();
        users
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }

    pub fn clear(&mut self) {
        self.deadlines.clear();
    }
}

/// Sender-side debounce for the local user's own typing indicator.
#[derive(Debug)]
pub struct TypingDebounce {
    delay: Duration,
    deadline: Option<Instant>,
}

impl TypingDebounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Register a keystroke. Returns true when a `typing` event should be
    /// emitted (the first keystroke after idle); every keystroke restarts
    /// the quiet-period countdown.
    pub fn keystroke(&mut self, now: Instant) -> bool {
        let was_idle = self.deadline.is_none();
        self.deadline = Some(now + self.delay);
        was_idle
    }

    /// Poll the countdown. Returns true once when the quiet period has
    /// elapsed and a `stop typing` event should be emitted.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Cancel the countdown (message sent or view closed). Returns true if
    /// an indicator was pending, in which case `stop typing` should be
    /// emitted immediately.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }
}
