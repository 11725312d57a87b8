//! The lobby directory: connections not in any game.

use std::collections::BTreeSet;

use pongforge_transport::ConnectionId;

/// Ordered set of connections currently in the lobby.
///
/// Ordering by id keeps broadcasts in connection order, which makes test
/// output deterministic.
#[derive(Debug, Default)]
pub struct LobbyDirectory {
    members: BTreeSet<ConnectionId>,
}

impl LobbyDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if `conn` was already present.
    pub fn insert(&mut self, conn: ConnectionId) -> bool {
        self.members.insert(conn)
    }

    /// Returns `false` if `conn` was not present.
    pub fn remove(&mut self, conn: ConnectionId) -> bool {
        self.members.remove(&conn)
    }

    pub fn contains(&self, conn: ConnectionId) -> bool {
        self.members.contains(&conn)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConnectionId> {
        self.members.iter()
    }
}
