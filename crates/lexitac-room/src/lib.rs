//! Rooms, game rules, and palette rotation for Lexitac.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns one
//! [`Game`]: the board, up to two players, and the state machine. While a
//! game is running the room also owns a palette rotation task.
//!
//! # Key types
//!
//! - [`RoomRegistry`]: creates rooms on first join, forgets aborted ones
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`Game`]: the synchronous rules engine behind a room
//! - [`RoomState`]: lifecycle state machine
//! - [`Rejection`] / [`Verdict`]: refused actions, as ordinary outcomes
//! - [`Dictionary`] / [`GameStore`]: the collaborators a room consults

mod config;
mod dictionary;
mod error;
mod game;
mod grid;
mod outcome;
mod palette;
mod player;
mod registry;
mod room;
mod rotation;
mod store;
mod words;

pub use config::{GameConfig, RoomState};
pub use dictionary::{Dictionary, DictionaryError, WordList};
pub use error::RoomError;
pub use game::{Game, MAX_PLAYERS};
pub use grid::{Cell, Grid};
pub use outcome::{Rejection, Verdict};
pub use palette::ALPHABET_LEN;
pub use player::Player;
pub use registry::RoomRegistry;
pub use room::{Departure, MoveOutcome, PlayerSender, RoomHandle, RoomInfo};
pub use store::{FinishedGame, GameStore, JsonLinesStore, MemoryStore, StoreError};
pub use words::{Line, WordMatch, find_word};
