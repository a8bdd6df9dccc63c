// libs/signaling-cell/src/services/rooms.rs
use std::collections::HashMap;

use crate::models::{ConnectionId, RoomId};

/// A connection's departure from one room, as reported by
/// [`RoomRegistry::leave_all`]. `remaining` is the membership after the
/// removal; the dispatcher notifies those peers.
#[derive(Debug, Clone, PartialEq)]
pub struct Departure {
    pub room: RoomId,
    pub remaining: Vec<ConnectionId>,
}

/// Maps a room identity to the ordered set of connection handles joined to
/// it.
///
/// Membership is insertion-ordered and duplicate-free: the membership `Vec`
/// doubles as the arrival order, and the first element is the original
/// caller. A room entry exists only while it has members; every operation
/// is total.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<RoomId, Vec<ConnectionId>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `connection` to `room` unless already present, creating the room
    /// entry on first join. Returns the resulting membership size.
    pub fn join(&mut self, room: RoomId, connection: ConnectionId) -> usize {
        let members = self.rooms.entry(room).or_default();
        if !members.contains(&connection) {
            members.push(connection);
        }
        members.len()
    }

    /// Removes `connection` from the named room, deleting the entry if it
    /// becomes empty.
    pub fn leave(&mut self, connection: ConnectionId, room: &RoomId) {
        if let Some(members) = self.rooms.get_mut(room) {
            members.retain(|m| *m != connection);
            if members.is_empty() {
                self.rooms.remove(room);
            }
        }
    }

    /// Removes `connection` from every room it is in, deleting rooms that
    /// drain to empty. Returns one [`Departure`] per affected room so the
    /// caller can notify the remaining members. Used on disconnect.
    pub fn leave_all(&mut self, connection: ConnectionId) -> Vec<Departure> {
        let mut departures = Vec::new();

        self.rooms.retain(|room, members| {
            let before = members.len();
            members.retain(|m| *m != connection);
            if members.len() < before {
                departures.push(Departure {
                    room: room.clone(),
                    remaining: members.clone(),
                });
            }
            !members.is_empty()
        });

        departures
    }

    /// Read-only membership snapshot, in insertion order. Empty for an
    /// unknown room.
    pub fn members(&self, room: &RoomId) -> &[ConnectionId] {
        self.rooms.get(room).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Forcibly drops the room entry regardless of membership. Used on
    /// explicit call termination.
    pub fn clear(&mut self, room: &RoomId) {
        self.rooms.remove(room);
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
