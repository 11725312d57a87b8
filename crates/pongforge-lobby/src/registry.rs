//! Connection registry: who is connected, where they are, and how to reach
//! them.

use std::collections::HashMap;

use pongforge_protocol::{GameId, Outbound};
use pongforge_transport::ConnectionId;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::LobbyError;

/// Channel sender for delivering outbound frames to a connection's writer
/// task. Bounded: a peer that stops reading loses frames instead of growing
/// the queue.
pub type OutboundSender = mpsc::Sender<Outbound>;

/// Where a connection currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    /// In the lobby, free to create or join a game.
    Lobby,
    /// Member of a game that has not started yet.
    Waiting(GameId),
    /// Member of a running match.
    Playing(GameId),
}

impl Membership {
    /// The game this membership refers to, if any.
    pub fn game_id(&self) -> Option<GameId> {
        match self {
            Self::Lobby => None,
            Self::Waiting(id) | Self::Playing(id) => Some(*id),
        }
    }
}

#[derive(Debug)]
struct Entry {
    outbound: OutboundSender,
    membership: Membership,
}

/// Every registered connection with its outbound channel and membership.
///
/// Sending never fails from the caller's point of view: frames for an
/// unregistered connection, one whose writer has gone away, or one whose
/// queue is full are dropped.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    entries: HashMap<ConnectionId, Entry>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection. It starts in the lobby.
    pub fn register(
        &mut self,
        conn: ConnectionId,
        outbound: OutboundSender,
    ) -> Result<(), LobbyError> {
        if self.entries.contains_key(&conn) {
            return Err(LobbyError::AlreadyConnected(conn));
        }
        self.entries.insert(
            conn,
            Entry {
                outbound,
                membership: Membership::Lobby,
            },
        );
        Ok(())
    }

    /// Removes a connection. Returns `false` if it was not registered.
    pub fn unregister(&mut self, conn: ConnectionId) -> bool {
        self.entries.remove(&conn).is_some()
    }

    pub fn contains(&self, conn: ConnectionId) -> bool {
        self.entries.contains_key(&conn)
    }

    /// Registered and its outbound channel still has a receiver.
    pub fn is_open(&self, conn: ConnectionId) -> bool {
        self.entries
            .get(&conn)
            .is_some_and(|entry| !entry.outbound.is_closed())
    }

    pub fn membership(&self, conn: ConnectionId) -> Option<Membership> {
        self.entries.get(&conn).map(|entry| entry.membership)
    }

    pub fn set_membership(
        &mut self,
        conn: ConnectionId,
        membership: Membership,
    ) -> Result<(), LobbyError> {
        let entry = self
            .entries
            .get_mut(&conn)
            .ok_or(LobbyError::UnknownConnection(conn))?;
        entry.membership = membership;
        Ok(())
    }

    /// Sends one frame. Returns `true` if it was queued.
    pub fn send(&self, conn: ConnectionId, msg: impl Into<Outbound>) -> bool {
        let Some(entry) = self.entries.get(&conn) else {
            return false;
        };
        match entry.outbound.try_send(msg.into()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::trace!(%conn, "outbound queue full, frame dropped");
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }

    /// Sends the same frame to each connection in `conns`. Returns how many
    /// were queued.
    pub fn broadcast<'a>(
        &self,
        conns: impl IntoIterator<Item = &'a ConnectionId>,
        msg: impl Into<Outbound>,
    ) -> usize {
        let msg = msg.into();
        conns
            .into_iter()
            .filter(|conn| self.send(**conn, msg.clone()))
            .count()
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
    use pongforge_protocol::ServerMessage;

    use super::*;

    fn conn(n: u64) -> ConnectionId {
        ConnectionId::new(n)
    }

    #[test]
    fn test_register_starts_in_lobby() {
        let mut reg = ConnectionRegistry::new();
        let (tx, _rx) = mpsc::channel(64);
        reg.register(conn(1), tx).unwrap();

        assert!(reg.contains(conn(1)));
        assert_eq!(reg.membership(conn(1)), Some(Membership::Lobby));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_register_twice_is_rejected() {
        let mut reg = ConnectionRegistry::new();
        let (tx, _rx) = mpsc::channel(64);
        reg.register(conn(1), tx.clone()).unwrap();

        let result = reg.register(conn(1), tx);
        assert!(matches!(result, Err(LobbyError::AlreadyConnected(c)) if c == conn(1)));
    }

    #[test]
    fn test_set_membership_unknown_connection() {
        let mut reg = ConnectionRegistry::new();
        let result = reg.set_membership(conn(9), Membership::Lobby);
        assert!(matches!(result, Err(LobbyError::UnknownConnection(_))));
    }

    #[test]
    fn test_send_skips_closed_and_unknown() {
        let mut reg = ConnectionRegistry::new();
        let (open_tx, mut open_rx) = mpsc::channel(64);
        let (closed_tx, closed_rx) = mpsc::channel(64);
        reg.register(conn(1), open_tx).unwrap();
        reg.register(conn(2), closed_tx).unwrap();
        drop(closed_rx);

        assert!(reg.is_open(conn(1)));
        assert!(!reg.is_open(conn(2)));

        let sent = reg.broadcast(
            &[conn(1), conn(2), conn(3)],
            ServerMessage::GameStarted,
        );
        assert_eq!(sent, 1);
        assert_eq!(
            open_rx.try_recv().unwrap(),
            Outbound::Message(ServerMessage::GameStarted)
        );
    }

    #[test]
    fn test_send_drops_frames_when_queue_full() {
        let mut reg = ConnectionRegistry::new();
        let (tx, mut rx) = mpsc::channel(2);
        reg.register(conn(1), tx).unwrap();

        assert!(reg.send(conn(1), ServerMessage::GameStarted));
        assert!(reg.send(conn(1), ServerMessage::PlayerLeftGame));
        // The peer is not reading: the third frame is dropped, not queued.
        assert!(!reg.send(conn(1), ServerMessage::GameStarted));
        assert!(reg.is_open(conn(1)));

        assert_eq!(
            rx.try_recv().unwrap(),
            Outbound::Message(ServerMessage::GameStarted)
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            Outbound::Message(ServerMessage::PlayerLeftGame)
        );
        assert!(rx.try_recv().is_err());

        // Once drained, delivery resumes.
        assert!(reg.send(conn(1), ServerMessage::GameStarted));
    }

    #[test]
    fn test_unregister_stops_delivery() {
        let mut reg = ConnectionRegistry::new();
        let (tx, mut rx) = mpsc::channel(64);
        reg.register(conn(1), tx).unwrap();

        assert!(reg.unregister(conn(1)));
        assert!(!reg.unregister(conn(1)));
        assert!(!reg.send(conn(1), ServerMessage::PlayerLeftGame));
        assert!(rx.try_recv().is_err());
        assert!(reg.is_empty());
    }

    #[test]
    fn test_membership_game_id() {
        assert_eq!(Membership::Lobby.game_id(), None);
        assert_eq!(Membership::Waiting(GameId(3)).game_id(), Some(GameId(3)));
        assert_eq!(Membership::Playing(GameId(4)).game_id(), Some(GameId(4)));
    }
}
