//! Per-connection handler: registration, inbound decoding, outbound writes.
//!
//! Each accepted socket gets its own Tokio task running this handler.
//! The flow is:
//!   0. Complete the WebSocket upgrade
//!   1. Register with the hub, handing it the outbound channel
//!   2. Spawn a writer task that drains that channel onto the socket
//!   3. Loop: receive frames → decode → forward to the hub
//!   4. On close, tell the hub the connection is gone

use std::sync::Arc;

use pongforge_protocol::{ClientMessage, Codec, Outbound};
use pongforge_transport::{
    Connection, ConnectionId, Handshake, PendingWebSocket, WebSocketConnection,
};
use tokio::sync::mpsc;

use crate::hub::HubHandle;
use crate::PongforgeError;

/// Handles a single connection from accept to close.
///
/// A failed upgrade ends the task before the hub ever hears of the
/// connection.
pub(crate) async fn handle_connection<C: Codec>(
    pending: PendingWebSocket,
    hub: HubHandle,
    codec: Arc<C>,
    outbound_capacity: usize,
) -> Result<(), PongforgeError> {
    let conn = Arc::new(pending.complete().await?);
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    let (outbound_tx, outbound_rx) = mpsc::channel(outbound_capacity.max(1));
    hub.connect(conn_id, outbound_tx).await?;

    let writer = tokio::spawn(write_outbound(
        Arc::clone(&conn),
        outbound_rx,
        Arc::clone(&codec),
    ));

    let read_result = read_inbound(&conn, &hub, codec.as_ref()).await;

    // The hub drops the outbound sender once it processes the disconnect,
    // which ends the writer on its own; abort covers a hub that is gone.
    let disconnect_result = hub.disconnect(conn_id).await;
    writer.abort();
    if let Err(e) = conn.close().await {
        tracing::trace!(%conn_id, error = %e, "close after disconnect failed");
    }

    read_result.and(disconnect_result)
}

/// Reads frames until the peer closes. Undecodable frames are skipped.
async fn read_inbound(
    conn: &WebSocketConnection,
    hub: &HubHandle,
    codec: &impl Codec,
) -> Result<(), PongforgeError> {
    let conn_id = conn.id();
    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%conn_id, "connection closed");
                return Ok(());
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                return Err(e.into());
            }
        };

        let msg: ClientMessage = match codec.decode(&data) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "ignoring malformed frame");
                continue;
            }
        };

        hub.inbound(conn_id, msg).await?;
    }
}

/// Drains the outbound channel onto the socket. A frame that fails to
/// send is dropped, not retried.
async fn write_outbound<C: Codec>(
    conn: Arc<WebSocketConnection>,
    mut outbound: mpsc::Receiver<Outbound>,
    codec: Arc<C>,
) {
    let conn_id: ConnectionId = conn.id();
    while let Some(frame) = outbound.recv().await {
        let bytes = match codec.encode(&frame) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(%conn_id, error = %e, "failed to encode frame");
                continue;
            }
        };
        if let Err(e) = conn.send(&bytes).await {
            tracing::debug!(%conn_id, error = %e, "send failed, frame dropped");
        }
    }
    tracing::trace!(%conn_id, "writer finished");
}
