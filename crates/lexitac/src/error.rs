//! Unified error type for the Lexitac server.

use lexitac_protocol::ProtocolError;
use lexitac_room::{DictionaryError, RoomError, StoreError};
use lexitac_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates the `From` impls, so
/// `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum LexitacError {
    /// A transport-level error (connection, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (collaborator failure, room gone).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// The word list couldn't be loaded.
    #[error(transparent)]
    Dictionary(#[from] DictionaryError),

    /// The finished-game store couldn't be opened.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Bad or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let lexitac_err: LexitacError = TransportError::ConnectionClosed.into();
        assert!(matches!(lexitac_err, LexitacError::Transport(_)));
        assert_eq!(lexitac_err.to_string(), "connection closed");
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let lexitac_err: LexitacError = err.into();
        assert!(matches!(lexitac_err, LexitacError::Protocol(_)));
    }

    #[test]
    fn test_from_room_error() {
        let err = RoomError::Unavailable(lexitac_protocol::RoomId::from("r1"));
        let lexitac_err: LexitacError = err.into();
        assert!(matches!(lexitac_err, LexitacError::Room(_)));
        assert!(lexitac_err.to_string().contains("room_r1"));
    }

    #[test]
    fn test_from_dictionary_error() {
        let err = DictionaryError::Unavailable("down".into());
        let lexitac_err: LexitacError = err.into();
        assert!(matches!(lexitac_err, LexitacError::Dictionary(_)));
    }

    #[test]
    fn test_config_error_message() {
        let err = LexitacError::Config("LEXITAC_GRID_SIZE: not a number".into());
        assert_eq!(
            err.to_string(),
            "configuration error: LEXITAC_GRID_SIZE: not a number"
        );
    }
}
