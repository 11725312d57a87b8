//! Unified error type for the Pongforge server.

use pongforge_lobby::LobbyError;
use pongforge_protocol::ProtocolError;
use pongforge_transport::TransportError;

use crate::ConfigError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum PongforgeError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A refused lobby request.
    #[error(transparent)]
    Lobby(#[from] LobbyError),

    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The hub actor has stopped and no longer accepts commands.
    #[error("hub is not running")]
    HubClosed,
}
