//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding frames.
///
/// A decode failure on an inbound frame is never fatal: the connection
/// handler logs it and waits for the next frame.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: not JSON, an unknown `type` tag, or a known
    /// tag with missing or mistyped fields.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),
}
