//! Transport abstraction layer for Pongforge.
//!
//! Provides the [`Transport`] and [`Connection`] traits so the server loop
//! never deals with sockets directly, plus the WebSocket implementation the
//! game server listens on.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{PendingWebSocket, WebSocketConnection, WebSocketTransport};

use std::fmt;

/// Opaque, stable identifier for a connection.
///
/// Everything above the transport (registry, lobby, game sessions) refers to
/// peers by this handle, never by socket. `Ord` lets it live in ordered sets
/// so lobby fan-out happens in connection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Accepts new incoming connections.
pub trait Transport: Send + Sync + 'static {
    /// An accepted socket whose protocol handshake has not run yet.
    type Pending: Handshake<Connection = Self::Connection, Error = Self::Error>;
    /// The connection type produced by this transport.
    type Connection: Connection;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for the next incoming socket.
    ///
    /// Only the raw accept happens here. The handshake runs in
    /// [`Handshake::complete`], typically on the connection's own task, so a
    /// peer that never finishes it cannot hold up the accept loop.
    async fn accept(&mut self) -> Result<Self::Pending, Self::Error>;
}

/// The second half of accepting a connection: the protocol handshake.
pub trait Handshake: Send + 'static {
    /// The connection produced once the handshake succeeds.
    type Connection: Connection;
    /// The error type for a failed handshake.
    type Error: std::error::Error + Send + Sync;

    /// The id the connection will carry. Assigned at accept time.
    fn id(&self) -> ConnectionId;

    /// Runs the handshake to completion.
    async fn complete(self) -> Result<Self::Connection, Self::Error>;
}

/// A single duplex connection that can send and receive frames.
///
/// Sending and receiving must not block each other: a connection handler
/// parks in [`recv`](Connection::recv) while a separate writer task pushes
/// snapshots through [`send`](Connection::send).
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync;

    /// Sends one frame to the remote peer.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Receives the next frame from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Closes the connection.
    async fn close(&self) -> Result<(), Self::Error>;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}
