//! # Lexitac
//!
//! A real-time, two-player word tic-tac-toe server.
//!
//! Players meet in a room by id, place letters from their palettes onto a
//! shared board, and win by completing a dictionary word along a row or a
//! column. This crate wires the layers together:
//! transport → protocol → room.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use lexitac::prelude::*;
//!
//! # async fn run() -> Result<(), LexitacError> {
//! let server = LexitacServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .game_config(GameConfig::default())
//!     .build(
//!         Arc::new(WordList::new(["crane", "slate"])),
//!         Arc::new(MemoryStore::new()),
//!     )
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;
pub mod telemetry;

pub use config::ServerConfig;
pub use error::LexitacError;
pub use server::{LexitacServer, LexitacServerBuilder};

pub mod prelude {
    pub use crate::{LexitacError, LexitacServer, LexitacServerBuilder, ServerConfig};
    pub use lexitac_protocol::{
        ClientMessage, GameSnapshot, PlayerName, PlayerView, RoomId, ServerMessage,
    };
    pub use lexitac_room::{
        Dictionary, GameConfig, GameStore, JsonLinesStore, MemoryStore, RoomRegistry, RoomState,
        WordList,
    };
}
