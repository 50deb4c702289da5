//! Error types for the protocol layer.
//!
//! Each Lexitac crate defines its own error enum, so a `ProtocolError`
//! always means the problem is in serialization or message shape, not in
//! networking or game rules.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, missing required fields,
    /// or an unknown message `type` tag.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message parsed but violates protocol rules, e.g. a
    /// `PlaceLetter` whose letter is not in `A..=Z`.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
