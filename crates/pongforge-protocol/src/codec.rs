//! Codec trait and implementations for serializing/deserializing frames.
//!
//! A codec converts between Rust types and raw bytes. The connection handler
//! only needs something that implements [`Codec`]; today that is
//! [`JsonCodec`], since browser clients speak JSON text frames.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because one codec value is shared by every
/// connection task for the lifetime of the server.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or don't
    /// match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ## Example
///
/// ```rust
/// use pongforge_protocol::{ClientMessage, Codec, GameId, JsonCodec};
///
/// let codec = JsonCodec;
/// let msg: ClientMessage = codec.decode(br#"{"type":"joinGame","gameId":3}"#).unwrap();
/// assert_eq!(msg, ClientMessage::JoinGame { game_id: GameId(3) });
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{ClientMessage, Outbound, ServerMessage};

    #[test]
    fn test_json_codec_decode_garbage_is_decode_error() {
        let result: Result<ClientMessage, _> = JsonCodec.decode(b"not json at all");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_json_codec_encodes_utf8_text() {
        let bytes = JsonCodec
            .encode(&Outbound::Message(ServerMessage::GameStarted))
            .unwrap();
        assert_eq!(std::str::from_utf8(&bytes).unwrap(), r#"{"type":"gameStarted"}"#);
    }
}
