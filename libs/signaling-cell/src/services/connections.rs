// libs/signaling-cell/src/services/connections.rs
use std::collections::HashMap;

use crate::models::{ConnectionId, UserId};

/// Maps a user identity to its currently-active connection handle.
///
/// At most one handle per user: a reconnect silently overwrites the mapping
/// (last connection wins) and the previous handle simply becomes
/// unreachable through the registry. Every operation is total — missing
/// keys are never an error.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    bindings: HashMap<UserId, ConnectionId>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `user` to `connection`, overwriting any existing binding.
    pub fn bind(&mut self, user: UserId, connection: ConnectionId) {
        self.bindings.insert(user, connection);
    }

    /// Removes every binding pointing at `connection`. Handles are unique
    /// per connection, so at most one entry goes away.
    pub fn unbind(&mut self, connection: ConnectionId) {
        self.bindings.retain(|_, bound| *bound != connection);
    }

    /// Where to deliver a direct notification for `user`, if anywhere.
    /// `None` means "not currently reachable", not an error.
    pub fn lookup(&self, user: &UserId) -> Option<ConnectionId> {
        self.bindings.get(user).copied()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
