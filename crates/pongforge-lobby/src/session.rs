//! Game sessions (open games) and matches (started games).
//!
//! A [`GameSession`] is what the lobby lists: a creator, an ordered member
//! list, and a status. Starting it consumes the session and produces a
//! [`Match`], which owns that game's ball and paddles.

use pongforge_physics::{Ball, Field, advance};
use pongforge_protocol::{GameId, GameListing, Snapshot};
use pongforge_transport::ConnectionId;

use crate::{GameStatus, LobbyError};

// ---------------------------------------------------------------------------
// GameSession
// ---------------------------------------------------------------------------

/// An open game waiting for its creator to start it.
#[derive(Debug, Clone)]
pub struct GameSession {
    id: GameId,
    creator: ConnectionId,
    status: GameStatus,
    /// Join order. The creator is first unless they left.
    members: Vec<ConnectionId>,
}

impl GameSession {
    /// A new session with `creator` as its only member.
    pub fn new(id: GameId, creator: ConnectionId) -> Self {
        Self {
            id,
            creator,
            status: GameStatus::Created,
            members: vec![creator],
        }
    }

    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn creator(&self) -> ConnectionId {
        self.creator
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn members(&self) -> &[ConnectionId] {
        &self.members
    }

    pub fn is_member(&self, conn: ConnectionId) -> bool {
        self.members.contains(&conn)
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Appends `conn` to the member list.
    pub fn add_member(
        &mut self,
        conn: ConnectionId,
        max_players: usize,
    ) -> Result<(), LobbyError> {
        if !self.status.is_joinable() {
            return Err(LobbyError::AlreadyStarted(self.id));
        }
        if self.is_member(conn) {
            return Err(LobbyError::AlreadyInGame(conn));
        }
        if self.members.len() >= max_players {
            return Err(LobbyError::GameFull(self.id));
        }
        self.members.push(conn);
        Ok(())
    }

    /// Removes `conn`. Returns `false` if it was not a member.
    pub fn remove_member(&mut self, conn: ConnectionId) -> bool {
        let before = self.members.len();
        self.members.retain(|member| *member != conn);
        self.members.len() != before
    }

    /// Checks that `requester` may start this game now.
    pub fn check_start(
        &self,
        requester: ConnectionId,
        min_players: usize,
    ) -> Result<(), LobbyError> {
        if !self.status.is_joinable() {
            return Err(LobbyError::AlreadyStarted(self.id));
        }
        if requester != self.creator {
            return Err(LobbyError::NotCreator {
                conn: requester,
                game_id: self.id,
            });
        }
        if self.members.len() < min_players {
            return Err(LobbyError::NotEnoughPlayers {
                game_id: self.id,
                have: self.members.len(),
                need: min_players,
            });
        }
        Ok(())
    }

    /// Moves the session to `Started` and hands its members to a new
    /// [`Match`]. Call [`check_start`](Self::check_start) first.
    pub fn start(mut self, field: &Field) -> Match {
        if let Some(next) = self.status.next() {
            self.status = next;
        }
        Match::new(self.id, self.members, field)
    }

    /// This session as a lobby summary entry.
    pub fn listing(&self) -> GameListing {
        GameListing {
            id: self.id,
            creator: self.is_member(self.creator),
            players: self.members.len(),
        }
    }
}

// ---------------------------------------------------------------------------
// Match
// ---------------------------------------------------------------------------

/// One paddle and the connection that steers it.
#[derive(Debug, Clone, Copy)]
struct Paddle {
    owner: Option<ConnectionId>,
    position: f64,
}

/// In-play state of a started game.
///
/// The first member owns the left paddle and the second the right one; any
/// further members only receive snapshots. A paddle whose owner leaves stays
/// where it was.
#[derive(Debug, Clone)]
pub struct Match {
    id: GameId,
    ball: Ball,
    left: Paddle,
    right: Paddle,
    members: Vec<ConnectionId>,
}

impl Match {
    fn new(id: GameId, members: Vec<ConnectionId>, field: &Field) -> Self {
        let paddle = |owner: Option<&ConnectionId>| Paddle {
            owner: owner.copied(),
            position: field.paddle_start,
        };
        Self {
            id,
            ball: Ball::launch(field),
            left: paddle(members.first()),
            right: paddle(members.get(1)),
            members,
        }
    }

    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn ball(&self) -> Ball {
        self.ball
    }

    pub fn members(&self) -> &[ConnectionId] {
        &self.members
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Moves the paddle owned by `conn`, clamped to the field.
    pub fn set_paddle(
        &mut self,
        conn: ConnectionId,
        position: f64,
        field: &Field,
    ) -> Result<(), LobbyError> {
        let paddle = if self.left.owner == Some(conn) {
            &mut self.left
        } else if self.right.owner == Some(conn) {
            &mut self.right
        } else {
            return Err(LobbyError::NotAPlayer(conn));
        };
        paddle.position = field.clamp_paddle(position);
        Ok(())
    }

    /// Removes `conn` from the members and releases any paddle it owned.
    /// Returns `false` if it was not a member.
    pub fn remove_member(&mut self, conn: ConnectionId) -> bool {
        let before = self.members.len();
        self.members.retain(|member| *member != conn);
        for paddle in [&mut self.left, &mut self.right] {
            if paddle.owner == Some(conn) {
                paddle.owner = None;
            }
        }
        self.members.len() != before
    }

    /// Runs one physics step.
    pub fn advance(&mut self, field: &Field) {
        self.ball = advance(self.ball, self.left.position, self.right.position, field);
    }

    /// The frame every member receives after a tick.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            player_position: self.left.position,
            opponent_position: self.right.position,
            ball: self.ball,
        }
    }
}
