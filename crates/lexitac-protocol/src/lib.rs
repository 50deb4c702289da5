//! Wire protocol for Lexitac.
//!
//! This crate defines what clients and the server say to each other:
//!
//! - **Types** ([`ClientMessage`], [`ServerMessage`], [`GameSnapshot`], etc.):
//!   the message structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those messages
//!   are converted to/from bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw bytes) and the room
//! layer (game rules). It doesn't know about connections or rooms;
//! it only knows how to serialize, deserialize, and sanity-check messages.
//!
//! ```text
//! Transport (bytes) → Protocol (ClientMessage) → Room (Game)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ClientMessage, GameSnapshot, PlayerName, PlayerView, Recipient, RoomId,
    ServerMessage,
};
