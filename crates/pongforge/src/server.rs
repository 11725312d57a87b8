//! `PongServer`: listener, hub, and accept loop.
//!
//! This is the entry point for running a Pongforge server. It ties the
//! layers together: transport → protocol → hub (lobby + tick).

use std::net::SocketAddr;
use std::sync::Arc;

use pongforge_lobby::SessionCoordinator;
use pongforge_protocol::{Codec, JsonCodec};
use pongforge_transport::{Handshake, Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::hub::{HubHandle, spawn_hub};
use crate::{PongforgeError, ServerConfig};

/// A bound Pongforge server.
///
/// Binding starts the hub (and with it the tick loop) right away; call
/// [`run()`](Self::run) to start accepting connections.
///
/// # Example
///
/// ```rust,no_run
/// use pongforge::{PongServer, ServerConfig};
///
/// # async fn start() -> Result<(), pongforge::PongforgeError> {
/// let server = PongServer::bind(ServerConfig::default()).await?;
/// server.run().await
/// # }
/// ```
pub struct PongServer<C: Codec = JsonCodec> {
    transport: WebSocketTransport,
    hub: HubHandle,
    codec: Arc<C>,
    outbound_capacity: usize,
}

impl PongServer<JsonCodec> {
    /// Binds the listener with the JSON codec browser clients speak.
    ///
    /// # Errors
    /// Returns `PongforgeError::Transport` if the address cannot be bound.
    pub async fn bind(config: ServerConfig) -> Result<Self, PongforgeError> {
        Self::with_codec(config, JsonCodec).await
    }
}

impl<C: Codec> PongServer<C> {
    /// Binds the listener with a custom codec.
    pub async fn with_codec(config: ServerConfig, codec: C) -> Result<Self, PongforgeError> {
        let transport = WebSocketTransport::bind(&config.bind_addr).await?;
        let coordinator = SessionCoordinator::new(config.lobby, config.field);
        let hub = spawn_hub(coordinator, config.tick, config.hub_channel_size);

        tracing::info!(addr = %config.bind_addr, "listener bound");
        Ok(Self {
            transport,
            hub,
            codec: Arc::new(codec),
            outbound_capacity: config.outbound_channel_size,
        })
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the accept loop.
    ///
    /// Spawns a handler task per accepted socket; the WebSocket upgrade runs
    /// on that task, so a peer stalling its handshake never delays the next
    /// accept. A failed accept or upgrade is logged and the loop keeps going;
    /// it only ends when the process does.
    pub async fn run(mut self) -> Result<(), PongforgeError> {
        tracing::info!("Pongforge server running");

        loop {
            match self.transport.accept().await {
                Ok(pending) => {
                    let hub = self.hub.clone();
                    let codec = Arc::clone(&self.codec);
                    let capacity = self.outbound_capacity;
                    tokio::spawn(async move {
                        let id = pending.id();
                        if let Err(e) = handle_connection(pending, hub, codec, capacity).await {
                            tracing::debug!(conn = %id, error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
