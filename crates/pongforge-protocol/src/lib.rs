//! Wire protocol for Pongforge.
//!
//! This crate defines what clients and the server say to each other:
//!
//! - **Types** ([`ClientMessage`], [`ServerMessage`], [`Snapshot`],
//!   [`Outbound`]): the JSON frames that travel on the socket.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those frames are turned
//!   into bytes and back.
//! - **Errors** ([`ProtocolError`]).
//!
//! # Architecture
//!
//! ```text
//! Transport (bytes) → Protocol (ClientMessage) → Lobby (coordinator)
//! ```
//!
//! The protocol layer knows nothing about connections or games in progress;
//! it only knows message shapes.

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use pongforge_physics::Ball;
pub use types::{
    ClientMessage, GameId, GameListing, LobbySummary, Outbound, ServerMessage,
    Snapshot,
};
