//! Lobby rules and the game status state machine.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// LobbyConfig
// ---------------------------------------------------------------------------

/// Rules for creating, joining, and starting games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LobbyConfig {
    /// Members required before the creator may start the game.
    pub min_players: usize,

    /// Members allowed in one game. Joins beyond this are refused.
    pub max_players: usize,
}

impl Default for LobbyConfig {
    fn default() -> Self {
        Self {
            min_players: 2,
            max_players: 2,
        }
    }
}

// ---------------------------------------------------------------------------
// GameStatus
// ---------------------------------------------------------------------------

/// Lifecycle of a game.
///
/// ```text
/// Created → Started
/// ```
///
/// - **Created**: listed in the lobby, accepting joins.
/// - **Started**: the creator started it; it is no longer listed or
///   joinable and its members are playing.
///
/// There is no way back: a started game stays started until its last member
/// leaves and it is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Created,
    Started,
}

impl GameStatus {
    /// Returns `true` if the game is accepting new members.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Created)
    }

    /// Returns the next status, or `None` from `Started`.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Created => Some(Self::Started),
            Self::Started => None,
        }
    }
}

impl std::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Started => write!(f, "started"),
        }
    }
}
