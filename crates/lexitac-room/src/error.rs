//! Error types for the room layer.
//!
//! Only collaborator failures live here. Rule violations are
//! [`Rejection`](crate::Rejection)s and never surface as errors.

use lexitac_protocol::RoomId;

use crate::dictionary::DictionaryError;
use crate::store::StoreError;

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The dictionary couldn't answer. The move that triggered the lookup
    /// stays on the board.
    #[error("word lookup failed: {0}")]
    Dictionary(#[from] DictionaryError),

    /// The finished game couldn't be saved. The game still ended.
    #[error("failed to persist finished game: {0}")]
    Persistence(#[from] StoreError),

    /// The room's command channel is closed (the actor has stopped).
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),
}
