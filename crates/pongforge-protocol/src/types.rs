//! Protocol types for Pongforge's wire format.
//!
//! Every frame is a JSON object. Tagged frames carry a camelCase `type`
//! field (`{"type":"joinGame","gameId":0}`); the periodic match snapshot is
//! the one untagged frame (`{"playerPosition":..,"opponentPosition":..,"ball":..}`)
//! because browser clients read it by shape.

use std::fmt;

use pongforge_physics::Ball;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Identifier of a game. Allocated from 0 upward and never reused while the
/// server runs.
///
/// `#[serde(transparent)]` keeps it a plain number on the wire.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct GameId(pub u64);

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "game-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Client → Server
// ---------------------------------------------------------------------------

/// Frames a client may send.
///
/// Anything that fails to decode into one of these (not JSON, unknown `type`,
/// wrong field types) is dropped by the connection handler without a reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// The sender's paddle moved to `position` (top edge, field units).
    PlayerPosition { position: f64 },

    /// Free-text chat, relayed to everyone in the lobby.
    ChatMessage { message: String },

    /// Open a new game with the sender as creator.
    CreateGame,

    /// Join an open game.
    JoinGame {
        #[serde(rename = "gameId")]
        game_id: GameId,
    },

    /// Start a game. Only its creator may do this.
    StartGame {
        #[serde(rename = "gameId")]
        game_id: GameId,
    },

    /// Leave the current game (open or started) and return to the lobby.
    LeaveGame,
}

// ---------------------------------------------------------------------------
// Server → Client
// ---------------------------------------------------------------------------

/// One open game as listed in the lobby summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameListing {
    pub id: GameId,
    /// Whether the creator is still a member (only the creator can start).
    pub creator: bool,
    /// Current member count.
    pub players: usize,
}

/// Lobby size plus every game still waiting to start.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbySummary {
    pub lobby_players: usize,
    pub games: Vec<GameListing>,
}

/// Tagged frames sent by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Reply to the creator of a new game.
    GameCreated {
        #[serde(rename = "gameId")]
        game_id: GameId,
    },

    /// Reply to a successful joiner.
    GameJoined {
        #[serde(rename = "gameId")]
        game_id: GameId,
    },

    /// Sent to every member when the creator starts the game.
    GameStarted,

    /// Sent to the remaining members when someone leaves their game.
    PlayerLeftGame,

    /// A relayed lobby chat line.
    ChatMessage { message: String },

    /// Lobby summary, sent to lobby members on every change and every tick.
    LobbyState { state: LobbySummary },
}

/// Paddle and ball state of one running game.
///
/// `player_position` is the left paddle (the creator's), `opponent_position`
/// the right paddle (the first joiner's).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub player_position: f64,
    pub opponent_position: f64,
    pub ball: Ball,
}

/// Anything the server pushes down a connection's outbound channel.
///
/// `#[serde(untagged)]` writes the inner value as-is, so a `Message` keeps
/// its `type` tag and a `Snapshot` stays a bare object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Outbound {
    Message(ServerMessage),
    Snapshot(Snapshot),
}

impl From<ServerMessage> for Outbound {
    fn from(msg: ServerMessage) -> Self {
        Self::Message(msg)
    }
}

impl From<Snapshot> for Outbound {
    fn from(snapshot: Snapshot) -> Self {
        Self::Snapshot(snapshot)
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The browser client matches on exact JSON shapes, so these tests pin
    //! the serde attributes down field by field.

    use serde_json::json;

    use super::*;

    fn decode(raw: &str) -> Result<ClientMessage, serde_json::Error> {
        serde_json::from_str(raw)
    }

    #[test]
    fn test_game_id_is_a_plain_number() {
        assert_eq!(serde_json::to_string(&GameId(4)).unwrap(), "4");
        assert_eq!(GameId(4).to_string(), "game-4");
    }

    // =====================================================================
    // ClientMessage
    // =====================================================================

    #[test]
    fn test_client_player_position_accepts_integers_and_floats() {
        assert_eq!(
            decode(r#"{"type":"playerPosition","position":200}"#).unwrap(),
            ClientMessage::PlayerPosition { position: 200.0 }
        );
        assert_eq!(
            decode(r#"{"type":"playerPosition","position":12.5}"#).unwrap(),
            ClientMessage::PlayerPosition { position: 12.5 }
        );
    }

    #[test]
    fn test_client_unit_messages_accept_empty_bodies() {
        assert_eq!(decode(r#"{"type":"createGame"}"#).unwrap(), ClientMessage::CreateGame);
        assert_eq!(decode(r#"{"type":"leaveGame"}"#).unwrap(), ClientMessage::LeaveGame);
    }

    #[test]
    fn test_client_join_and_start_use_camel_case_game_id() {
        assert_eq!(
            decode(r#"{"type":"joinGame","gameId":0}"#).unwrap(),
            ClientMessage::JoinGame { game_id: GameId(0) }
        );
        assert_eq!(
            decode(r#"{"type":"startGame","gameId":7}"#).unwrap(),
            ClientMessage::StartGame { game_id: GameId(7) }
        );
        assert!(decode(r#"{"type":"joinGame","game_id":0}"#).is_err());
    }

    #[test]
    fn test_client_chat_message() {
        assert_eq!(
            decode(r#"{"type":"chatMessage","message":"gg"}"#).unwrap(),
            ClientMessage::ChatMessage { message: "gg".into() }
        );
    }

    #[test]
    fn test_client_unknown_type_is_rejected() {
        assert!(decode(r#"{"type":"flyToMoon"}"#).is_err());
        assert!(decode(r#"{"position":3}"#).is_err());
        assert!(decode(r#"{"type":"joinGame","gameId":"zero"}"#).is_err());
    }

    // =====================================================================
    // ServerMessage / Outbound
    // =====================================================================

    #[test]
    fn test_server_game_created_shape() {
        let msg = ServerMessage::GameCreated { game_id: GameId(0) };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"type": "gameCreated", "gameId": 0})
        );
    }

    #[test]
    fn test_server_unit_messages_carry_only_the_tag() {
        assert_eq!(
            serde_json::to_value(ServerMessage::GameStarted).unwrap(),
            json!({"type": "gameStarted"})
        );
        assert_eq!(
            serde_json::to_value(ServerMessage::PlayerLeftGame).unwrap(),
            json!({"type": "playerLeftGame"})
        );
    }

    #[test]
    fn test_server_lobby_state_shape() {
        let msg = ServerMessage::LobbyState {
            state: LobbySummary {
                lobby_players: 3,
                games: vec![GameListing {
                    id: GameId(2),
                    creator: true,
                    players: 1,
                }],
            },
        };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({
                "type": "lobbyState",
                "state": {
                    "lobbyPlayers": 3,
                    "games": [{"id": 2, "creator": true, "players": 1}]
                }
            })
        );
    }

    #[test]
    fn test_outbound_snapshot_is_untagged() {
        let out = Outbound::from(Snapshot {
            player_position: 200.0,
            opponent_position: 150.0,
            ball: Ball {
                x: 395.0,
                y: 195.0,
                dx: 2.0,
                dy: 2.0,
            },
        });
        let value = serde_json::to_value(&out).unwrap();
        assert_eq!(
            value,
            json!({
                "playerPosition": 200.0,
                "opponentPosition": 150.0,
                "ball": {"x": 395.0, "y": 195.0, "dx": 2.0, "dy": 2.0}
            })
        );
        assert!(value.get("type").is_none());
    }

    #[test]
    fn test_outbound_message_keeps_its_tag() {
        let out = Outbound::from(ServerMessage::ChatMessage { message: "hi".into() });
        assert_eq!(
            serde_json::to_value(&out).unwrap(),
            json!({"type": "chatMessage", "message": "hi"})
        );
    }
}
