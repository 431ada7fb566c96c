//! Presence registry: the authoritative user -> connection map.

use std::collections::HashMap;

use crate::domain::{ConnectionId, UserId};

/// In-memory mapping of user identity to the connection currently serving
/// that user. At most one entry per user: a second `setup` from the same
/// user silently replaces the first (last socket wins).
///
/// Constructed once at process start and injected into the router; state is
/// dropped entirely on restart and clients are expected to re-run `setup`.
#[derive(Debug, Default)]
pub struct PresenceRegistry {
    entries: HashMap<UserId, ConnectionId>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `user` to `conn`, unconditionally overwriting any prior mapping.
    /// Returns the replaced connection, if any.
    pub fn set_online(&mut self, user: UserId, conn: ConnectionId) -> Option<ConnectionId> {
        self.entries.insert(user, conn)
    }

    /// Remove the mapping for `user` only if it still points at `conn`.
    ///
    /// A disconnect from a superseded connection must not evict the entry a
    /// newer connection has installed. Returns whether an entry was removed.
    pub fn remove_if_current(&mut self, user: &UserId, conn: ConnectionId) -> bool {
        match self.entries.get(user) {
            Some(current) if *current == conn => {
                self.entries.remove(user);
                true
            }
            _ => false,
        }
    }

    /// Current connection for `user`, if online.
    pub fn connection_id_for(&self, user: &UserId) -> Option<ConnectionId> {
        self.entries.get(user).copied()
    }

    pub fn is_online(&self, user: &UserId) -> bool {
        self.entries.contains_key(user)
    }

    /// Snapshot of all online users, sorted for stable output.
    pub fn online_users(&self) -> Vec<UserId> {
        let mut users: Vec<UserId> = self.entries.keys().cloned().collect();
        users.sort();
        users
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
