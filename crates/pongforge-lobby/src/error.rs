//! Error types for the lobby layer.

use pongforge_protocol::GameId;
use pongforge_transport::ConnectionId;

/// Reasons a lobby request was refused.
///
/// None of these are reported to the client: the hub logs them at debug
/// level and the request has no effect.
#[derive(Debug, thiserror::Error)]
pub enum LobbyError {
    /// The connection is not registered (never connected, or already gone).
    #[error("connection {0} is not registered")]
    UnknownConnection(ConnectionId),

    /// The connection id is already registered.
    #[error("connection {0} is already registered")]
    AlreadyConnected(ConnectionId),

    /// No game with this id is open or running.
    #[error("game {0} not found")]
    NotFound(GameId),

    /// The connection is already a member of a game.
    #[error("connection {0} is already in a game")]
    AlreadyInGame(ConnectionId),

    /// The game has been started and no longer accepts joins or starts.
    #[error("game {0} has already started")]
    AlreadyStarted(GameId),

    /// The game has no free member slot.
    #[error("game {0} is full")]
    GameFull(GameId),

    /// Only the creator may start a game.
    #[error("connection {conn} is not the creator of game {game_id}")]
    NotCreator {
        conn: ConnectionId,
        game_id: GameId,
    },

    /// Too few members to start.
    #[error("game {game_id} has {have} members, needs {need}")]
    NotEnoughPlayers {
        game_id: GameId,
        have: usize,
        need: usize,
    },

    /// The connection is in the lobby, not in a game.
    #[error("connection {0} is not in a game")]
    NotInGame(ConnectionId),

    /// The connection is watching a match but owns no paddle.
    #[error("connection {0} does not control a paddle")]
    NotAPlayer(ConnectionId),

    /// A paddle position that is NaN or infinite.
    #[error("invalid paddle position {0}")]
    InvalidPosition(f64),
}
