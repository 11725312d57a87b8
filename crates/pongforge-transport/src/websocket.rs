//! WebSocket transport implementation using `tokio-tungstenite`.

use std::net::SocketAddr;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;

use crate::{Connection, ConnectionId, Handshake, Transport, TransportError};

type WsStream = tokio_tungstenite::WebSocketStream<TcpStream>;

/// A WebSocket-based [`Transport`] that listens for incoming connections.
///
/// Connection ids are handed out from a per-transport counter starting at 1,
/// so two servers in one process never share state.
pub struct WebSocketTransport {
    listener: TcpListener,
    next_id: u64,
}

impl WebSocketTransport {
    /// Binds a new WebSocket transport to the given address.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr).await.map_err(|source| {
            TransportError::BindFailed {
                addr: addr.to_string(),
                source,
            }
        })?;
        tracing::info!(addr, "WebSocket transport listening");
        Ok(Self {
            listener,
            next_id: 1,
        })
    }

    /// Returns the address the listener is actually bound to.
    ///
    /// Useful after binding to port 0.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

impl Transport for WebSocketTransport {
    type Pending = PendingWebSocket;
    type Connection = WebSocketConnection;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<Self::Pending, Self::Error> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;

        let id = ConnectionId::new(self.next_id);
        self.next_id += 1;
        tracing::trace!(%id, %addr, "accepted TCP connection");

        Ok(PendingWebSocket { id, addr, stream })
    }
}

/// A TCP connection waiting for its WebSocket upgrade request.
pub struct PendingWebSocket {
    id: ConnectionId,
    addr: SocketAddr,
    stream: TcpStream,
}

impl PendingWebSocket {
    /// The peer's address.
    pub fn peer_addr(&self) -> SocketAddr {
        self.addr
    }
}

impl Handshake for PendingWebSocket {
    type Connection = WebSocketConnection;
    type Error = TransportError;

    fn id(&self) -> ConnectionId {
        self.id
    }

    async fn complete(self) -> Result<Self::Connection, Self::Error> {
        let Self { id, addr, stream } = self;
        let ws = tokio_tungstenite::accept_async(stream)
            .await
            .map_err(|e| {
                TransportError::AcceptFailed(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    e,
                ))
            })?;
        tracing::debug!(%id, %addr, "accepted WebSocket connection");

        // Reading and writing get separate locks so a handler parked in
        // `recv` never stalls outbound snapshots.
        let (sink, stream) = ws.split();
        Ok(WebSocketConnection {
            id,
            sink: Mutex::new(sink),
            stream: Mutex::new(stream),
        })
    }
}

/// A single WebSocket connection.
pub struct WebSocketConnection {
    id: ConnectionId,
    sink: Mutex<SplitSink<WsStream, Message>>,
    stream: Mutex<SplitStream<WsStream>>,
}

impl Connection for WebSocketConnection {
    type Error = TransportError;

    /// Sends `data` as a text frame when it is valid UTF-8 (every JSON frame
    /// the server produces), otherwise as a binary frame.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error> {
        let msg = match std::str::from_utf8(data) {
            Ok(text) => Message::text(text.to_owned()),
            Err(_) => Message::binary(data.to_vec()),
        };
        self.sink.lock().await.send(msg).await.map_err(|e| {
            TransportError::SendFailed(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                e,
            ))
        })
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        let mut stream = self.stream.lock().await;
        loop {
            match stream.next().await {
                Some(Ok(Message::Text(text))) => {
                    return Ok(Some(text.as_str().as_bytes().to_vec()));
                }
                Some(Ok(Message::Binary(data))) => {
                    return Ok(Some(data.to_vec()));
                }
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue, // ping/pong/raw frame
                Some(Err(e)) => {
                    return Err(TransportError::ReceiveFailed(
                        std::io::Error::new(
                            std::io::ErrorKind::ConnectionReset,
                            e,
                        ),
                    ));
                }
            }
        }
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.sink.lock().await.close().await.map_err(|e| {
            TransportError::SendFailed(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                e,
            ))
        })
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
