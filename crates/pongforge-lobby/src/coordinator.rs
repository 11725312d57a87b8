//! Session coordinator: the single owner of lobby, game, and match state.
//!
//! Every client request ends up here as one method call. The coordinator is
//! plain synchronous data; the hub actor in the `pongforge` crate owns one
//! and feeds it commands and ticks one at a time, so no locking is needed.
//!
//! A request that does not apply in the current state returns a
//! [`LobbyError`] and changes nothing. Clients never see these errors.

use std::collections::BTreeMap;

use pongforge_physics::Field;
use pongforge_protocol::{ClientMessage, GameId, LobbySummary, ServerMessage};
use pongforge_transport::ConnectionId;

use crate::{
    ConnectionRegistry, GameSession, LobbyConfig, LobbyDirectory, LobbyError, Match,
    Membership, OutboundSender,
};

/// Owns every connection, open game, and running match.
#[derive(Debug)]
pub struct SessionCoordinator {
    pub(crate) config: LobbyConfig,
    pub(crate) field: Field,
    pub(crate) registry: ConnectionRegistry,
    pub(crate) lobby: LobbyDirectory,
    /// Open games, listed in the lobby summary.
    pub(crate) sessions: BTreeMap<GameId, GameSession>,
    /// Started games.
    pub(crate) matches: BTreeMap<GameId, Match>,
    next_game_id: u64,
}

impl SessionCoordinator {
    pub fn new(config: LobbyConfig, field: Field) -> Self {
        Self {
            config,
            field,
            registry: ConnectionRegistry::new(),
            lobby: LobbyDirectory::new(),
            sessions: BTreeMap::new(),
            matches: BTreeMap::new(),
            next_game_id: 0,
        }
    }

    // -----------------------------------------------------------------------
    // Requests
    // -----------------------------------------------------------------------

    /// Routes a decoded client frame to the matching operation.
    pub fn handle(
        &mut self,
        conn: ConnectionId,
        msg: ClientMessage,
    ) -> Result<(), LobbyError> {
        match msg {
            ClientMessage::PlayerPosition { position } => self.update_paddle(conn, position),
            ClientMessage::ChatMessage { message } => self.chat(conn, message),
            ClientMessage::CreateGame => self.create_game(conn).map(|_| ()),
            ClientMessage::JoinGame { game_id } => self.join_game(conn, game_id),
            ClientMessage::StartGame { game_id } => self.start_game(conn, game_id),
            ClientMessage::LeaveGame => self.leave_game(conn),
        }
    }

    /// Registers a new connection and places it in the lobby.
    pub fn connect(
        &mut self,
        conn: ConnectionId,
        outbound: OutboundSender,
    ) -> Result<(), LobbyError> {
        self.registry.register(conn, outbound)?;
        self.set_membership(conn, Membership::Lobby)?;
        tracing::info!(%conn, lobby = self.lobby.len(), "connection entered lobby");
        self.broadcast_summary();
        Ok(())
    }

    /// Opens a new game with `conn` as creator and only member.
    pub fn create_game(&mut self, conn: ConnectionId) -> Result<GameId, LobbyError> {
        self.ensure_in_lobby(conn)?;

        let game_id = GameId(self.next_game_id);
        self.next_game_id += 1;
        self.sessions.insert(game_id, GameSession::new(game_id, conn));
        self.set_membership(conn, Membership::Waiting(game_id))?;

        self.registry.send(conn, ServerMessage::GameCreated { game_id });
        tracing::info!(%conn, %game_id, "game created");
        self.broadcast_summary();
        Ok(game_id)
    }

    /// Adds `conn` to an open game.
    pub fn join_game(
        &mut self,
        conn: ConnectionId,
        game_id: GameId,
    ) -> Result<(), LobbyError> {
        self.ensure_in_lobby(conn)?;

        let max_players = self.config.max_players;
        let session = self.open_session_mut(game_id)?;
        session.add_member(conn, max_players)?;
        let players = session.members().len();
        self.set_membership(conn, Membership::Waiting(game_id))?;

        self.registry.send(conn, ServerMessage::GameJoined { game_id });
        tracing::info!(%conn, %game_id, players, "joined game");
        self.broadcast_summary();
        Ok(())
    }

    /// Starts an open game. Only its creator may, and only with enough
    /// members.
    pub fn start_game(
        &mut self,
        conn: ConnectionId,
        game_id: GameId,
    ) -> Result<(), LobbyError> {
        let min_players = self.config.min_players;
        self.open_session_mut(game_id)?
            .check_start(conn, min_players)?;
        let session = self
            .sessions
            .remove(&game_id)
            .ok_or(LobbyError::NotFound(game_id))?;

        let started = session.start(&self.field);
        for member in started.members() {
            self.set_membership(*member, Membership::Playing(game_id))?;
        }
        self.registry
            .broadcast(started.members(), ServerMessage::GameStarted);
        tracing::info!(
            %game_id,
            players = started.members().len(),
            "game started"
        );
        self.matches.insert(game_id, started);

        self.broadcast_summary();
        Ok(())
    }

    /// Leaves the current game (open or started) and returns to the lobby.
    pub fn leave_game(&mut self, conn: ConnectionId) -> Result<(), LobbyError> {
        match self.membership(conn)? {
            Membership::Lobby => Err(LobbyError::NotInGame(conn)),
            _ => {
                self.detach(conn)?;
                self.set_membership(conn, Membership::Lobby)?;
                tracing::info!(%conn, "returned to lobby");
                self.broadcast_summary();
                Ok(())
            }
        }
    }

    /// Removes a closed connection from wherever it was, then forgets it.
    pub fn disconnect(&mut self, conn: ConnectionId) -> Result<(), LobbyError> {
        self.leave_or_disconnect(conn)?;
        self.registry.unregister(conn);
        tracing::info!(%conn, "connection removed");
        Ok(())
    }

    /// Moves the paddle `conn` owns in its match.
    pub fn update_paddle(
        &mut self,
        conn: ConnectionId,
        position: f64,
    ) -> Result<(), LobbyError> {
        if !position.is_finite() {
            return Err(LobbyError::InvalidPosition(position));
        }
        let Membership::Playing(game_id) = self.membership(conn)? else {
            return Err(LobbyError::NotInGame(conn));
        };
        let field = self.field;
        self.matches
            .get_mut(&game_id)
            .ok_or(LobbyError::NotFound(game_id))?
            .set_paddle(conn, position, &field)
    }

    /// Relays a chat line to everyone in the lobby.
    pub fn chat(&mut self, conn: ConnectionId, message: String) -> Result<(), LobbyError> {
        if !self.registry.contains(conn) {
            return Err(LobbyError::UnknownConnection(conn));
        }
        let delivered = self
            .registry
            .broadcast(self.lobby.iter(), ServerMessage::ChatMessage { message });
        tracing::debug!(%conn, delivered, "chat relayed");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Lobby size plus every open game, in id order.
    pub fn lobby_summary(&self) -> LobbySummary {
        LobbySummary {
            lobby_players: self.lobby.len(),
            games: self.sessions.values().map(GameSession::listing).collect(),
        }
    }

    pub fn config(&self) -> &LobbyConfig {
        &self.config
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn lobby(&self) -> &LobbyDirectory {
        &self.lobby
    }

    /// An open (not yet started) game.
    pub fn session(&self, game_id: GameId) -> Option<&GameSession> {
        self.sessions.get(&game_id)
    }

    /// A started game.
    pub fn running_match(&self, game_id: GameId) -> Option<&Match> {
        self.matches.get(&game_id)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Shared cleanup for leaving and disconnecting: removes `conn` from
    /// the lobby or its game and re-broadcasts the lobby summary.
    fn leave_or_disconnect(&mut self, conn: ConnectionId) -> Result<(), LobbyError> {
        self.detach(conn)?;
        self.broadcast_summary();
        Ok(())
    }

    /// Takes `conn` out of the lobby directory, session, or match it is in.
    /// Emptied games are discarded; remaining members are told someone left.
    fn detach(&mut self, conn: ConnectionId) -> Result<(), LobbyError> {
        match self.membership(conn)? {
            Membership::Lobby => {
                self.lobby.remove(conn);
            }
            Membership::Waiting(game_id) => {
                if let Some(session) = self.sessions.get_mut(&game_id) {
                    session.remove_member(conn);
                    if session.is_empty() {
                        self.sessions.remove(&game_id);
                        tracing::info!(%game_id, "empty game discarded");
                    } else {
                        self.registry
                            .broadcast(session.members(), ServerMessage::PlayerLeftGame);
                        tracing::info!(%conn, %game_id, "left game");
                    }
                }
            }
            Membership::Playing(game_id) => {
                if let Some(running) = self.matches.get_mut(&game_id) {
                    running.remove_member(conn);
                    if running.is_empty() {
                        self.matches.remove(&game_id);
                        tracing::info!(%game_id, "empty match discarded");
                    } else {
                        self.registry
                            .broadcast(running.members(), ServerMessage::PlayerLeftGame);
                        tracing::info!(%conn, %game_id, "left match");
                    }
                }
            }
        }
        Ok(())
    }

    fn membership(&self, conn: ConnectionId) -> Result<Membership, LobbyError> {
        self.registry
            .membership(conn)
            .ok_or(LobbyError::UnknownConnection(conn))
    }

    fn ensure_in_lobby(&self, conn: ConnectionId) -> Result<(), LobbyError> {
        match self.membership(conn)? {
            Membership::Lobby => Ok(()),
            _ => Err(LobbyError::AlreadyInGame(conn)),
        }
    }

    /// Looks up an open game, telling "started" apart from "never existed".
    fn open_session_mut(&mut self, game_id: GameId) -> Result<&mut GameSession, LobbyError> {
        if self.matches.contains_key(&game_id) {
            return Err(LobbyError::AlreadyStarted(game_id));
        }
        self.sessions
            .get_mut(&game_id)
            .ok_or(LobbyError::NotFound(game_id))
    }

    /// Updates the registry and keeps the lobby directory in step with it.
    fn set_membership(
        &mut self,
        conn: ConnectionId,
        membership: Membership,
    ) -> Result<(), LobbyError> {
        self.registry.set_membership(conn, membership)?;
        if membership == Membership::Lobby {
            self.lobby.insert(conn);
        } else {
            self.lobby.remove(conn);
        }
        Ok(())
    }

    pub(crate) fn broadcast_summary(&self) -> usize {
        self.registry.broadcast(
            self.lobby.iter(),
            ServerMessage::LobbyState {
                state: self.lobby_summary(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use pongforge_protocol::Outbound;
    use tokio::sync::mpsc;

    use super::*;

    fn coordinator() -> SessionCoordinator {
        SessionCoordinator::new(LobbyConfig::default(), Field::default())
    }

    fn connect(
        coord: &mut SessionCoordinator,
        n: u64,
    ) -> (ConnectionId, mpsc::Receiver<Outbound>) {
        let (tx, rx) = mpsc::channel(64);
        let conn = ConnectionId::new(n);
        coord.connect(conn, tx).unwrap();
        (conn, rx)
    }

    #[test]
    fn test_game_ids_start_at_zero_and_are_not_reused() {
        let mut coord = coordinator();
        let (a, _ra) = connect(&mut coord, 1);

        assert_eq!(coord.create_game(a).unwrap(), GameId(0));
        coord.leave_game(a).unwrap();
        assert_eq!(coord.session_count(), 0);
        assert_eq!(coord.create_game(a).unwrap(), GameId(1));
    }

    #[test]
    fn test_create_game_twice_is_rejected() {
        let mut coord = coordinator();
        let (a, _ra) = connect(&mut coord, 1);

        coord.create_game(a).unwrap();
        assert!(matches!(
            coord.create_game(a),
            Err(LobbyError::AlreadyInGame(_))
        ));
        assert_eq!(coord.session_count(), 1);
    }

    #[test]
    fn test_directory_tracks_membership() {
        let mut coord = coordinator();
        let (a, _ra) = connect(&mut coord, 1);
        let (b, _rb) = connect(&mut coord, 2);
        assert_eq!(coord.lobby().len(), 2);

        let id = coord.create_game(a).unwrap();
        assert!(!coord.lobby().contains(a));
        coord.join_game(b, id).unwrap();
        assert!(coord.lobby().is_empty());

        coord.start_game(a, id).unwrap();
        assert_eq!(coord.registry().membership(a), Some(Membership::Playing(id)));
        assert!(coord.lobby().is_empty());

        coord.leave_game(b).unwrap();
        assert!(coord.lobby().contains(b));
        assert_eq!(coord.registry().membership(b), Some(Membership::Lobby));
    }

    #[test]
    fn test_requests_from_unknown_connection() {
        let mut coord = coordinator();
        let ghost = ConnectionId::new(42);
        assert!(matches!(
            coord.create_game(ghost),
            Err(LobbyError::UnknownConnection(_))
        ));
        assert!(matches!(
            coord.disconnect(ghost),
            Err(LobbyError::UnknownConnection(_))
        ));
        assert!(matches!(
            coord.chat(ghost, "hi".into()),
            Err(LobbyError::UnknownConnection(_))
        ));
    }

    #[test]
    fn test_leave_game_from_lobby_is_rejected() {
        let mut coord = coordinator();
        let (a, _ra) = connect(&mut coord, 1);
        assert!(matches!(coord.leave_game(a), Err(LobbyError::NotInGame(_))));
    }

    #[test]
    fn test_update_paddle_rejects_non_finite() {
        let mut coord = coordinator();
        let (a, _ra) = connect(&mut coord, 1);
        assert!(matches!(
            coord.update_paddle(a, f64::NAN),
            Err(LobbyError::InvalidPosition(_))
        ));
        assert!(matches!(
            coord.update_paddle(a, 10.0),
            Err(LobbyError::NotInGame(_))
        ));
    }

    #[test]
    fn test_handle_dispatches_client_messages() {
        let mut coord = coordinator();
        let (a, _ra) = connect(&mut coord, 1);
        let (b, _rb) = connect(&mut coord, 2);

        coord.handle(a, ClientMessage::CreateGame).unwrap();
        coord
            .handle(b, ClientMessage::JoinGame { game_id: GameId(0) })
            .unwrap();
        coord
            .handle(a, ClientMessage::StartGame { game_id: GameId(0) })
            .unwrap();
        coord
            .handle(b, ClientMessage::PlayerPosition { position: 120.0 })
            .unwrap();

        let running = coord.running_match(GameId(0)).unwrap();
        assert_eq!(running.snapshot().opponent_position, 120.0);
    }
}
