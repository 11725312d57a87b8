//! Lobby, game sessions, and tick broadcast for Pongforge.
//!
//! All game-side state lives in one [`SessionCoordinator`]. It is plain
//! synchronous data: the server's hub actor owns it and calls into it for
//! every client request and every tick.
//!
//! # Key types
//!
//! - [`SessionCoordinator`]: create/join/start/leave, chat, paddles, ticks
//! - [`ConnectionRegistry`]: outbound channel and [`Membership`] per connection
//! - [`LobbyDirectory`]: connections not in any game
//! - [`GameSession`] / [`Match`]: an open game and a started one
//! - [`LobbyConfig`] / [`GameStatus`]: rules and lifecycle

mod broadcast;
mod config;
mod coordinator;
mod directory;
mod error;
mod registry;
mod session;

pub use broadcast::TickReport;
pub use config::{GameStatus, LobbyConfig};
pub use coordinator::SessionCoordinator;
pub use directory::LobbyDirectory;
pub use error::LobbyError;
pub use registry::{ConnectionRegistry, Membership, OutboundSender};
pub use session::{GameSession, Match};
