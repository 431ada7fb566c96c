//! Room membership: per-room subscription sets.

use std::collections::{HashMap, HashSet};

use crate::domain::{ConnectionId, RoomKey};

/// Named broadcast groups. Rooms are created implicitly on first join and
/// garbage-collected when their last member leaves. Membership is a set, so
/// joining twice has no additional effect.
#[derive(Debug, Default)]
pub struct RoomMembership {
    rooms: HashMap<RoomKey, HashSet<ConnectionId>>,
    // reverse index so leave_all only touches the rooms a connection is in
    joined: HashMap<ConnectionId, HashSet<RoomKey>>,
}

impl RoomMembership {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `conn` to `room`. Idempotent.
    pub fn join(&mut self, conn: ConnectionId, room: RoomKey) {
        self.rooms.entry(room.clone()).or_default().insert(conn);
        self.joined.entry(conn).or_default().insert(room);
    }

    /// Remove `conn` from `room`. Idempotent; unknown rooms are a no-op.
    pub fn leave(&mut self, conn: ConnectionId, room: &RoomKey) {
        if let Some(members) = self.rooms.get_mut(room) {
            members.remove(&conn);
            if members.is_empty() {
                self.rooms.remove(room);
            }
        }
        if let Some(rooms) = self.joined.get_mut(&conn) {
            rooms.remove(room);
            if rooms.is_empty() {
                self.joined.remove(&conn);
            }
        }
    }

    /// Remove `conn` from every room it has joined. Invoked on disconnect;
    /// safe to call again for an already-departed connection.
    pub fn leave_all(&mut self, conn: ConnectionId) {
        let Some(rooms) = self.joined.remove(&conn) else {
            return;
        };
        for room in rooms {
            if let Some(members) = self.rooms.get_mut(&room) {
                members.remove(&conn);
                if members.is_empty() {
                    self.rooms.remove(&room);
                }
            }
        }
    }

    /// Members of `room`; empty for an unknown room, never an error.
    pub fn members_of(&self, room: &RoomKey) -> Vec<ConnectionId> {
        self.rooms
            .get(room)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
