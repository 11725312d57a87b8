//! # Pongforge
//!
//! Authoritative multiplayer pong server with a lobby.
//!
//! Clients connect over WebSocket and land in the lobby, where they can chat,
//! create games, and join open ones. The creator starts a game once enough
//! players have joined; from then on the server runs the ball physics and
//! streams paddle-and-ball snapshots to the players every tick.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pongforge::prelude::*;
//!
//! # async fn start() -> Result<(), PongforgeError> {
//! let server = PongServer::bind(ServerConfig::from_env()?).await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod hub;
mod server;

pub use config::{ConfigError, DEFAULT_PORT, ServerConfig};
pub use error::PongforgeError;
pub use server::PongServer;

pub use pongforge_lobby as lobby;
pub use pongforge_physics as physics;
pub use pongforge_protocol as protocol;
pub use pongforge_tick as tick;
pub use pongforge_transport as transport;

/// Everything needed to configure and run a server.
pub mod prelude {
    pub use crate::{ConfigError, PongServer, PongforgeError, ServerConfig};
    pub use pongforge_lobby::LobbyConfig;
    pub use pongforge_physics::Field;
    pub use pongforge_tick::{TickConfig, TickPolicy};
}
