//! Persistence of finished games.
//!
//! A room hands its final board and roster to a [`GameStore`] exactly once,
//! when a word is found. Aborted games are never saved.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use lexitac_protocol::{PlayerName, PlayerView, RoomId};
use serde::{Deserialize, Serialize};

use crate::grid::Cell;
use crate::words::WordMatch;

/// Errors raised by a game store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to encode finished game: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// The record kept for a game that ended with a word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinishedGame {
    pub room_id: RoomId,
    /// Final board, row-major.
    pub grid: Vec<Vec<Cell>>,
    /// Roster at the moment the game ended, in join order.
    pub players: Vec<PlayerView>,
    /// The player whose move completed the word.
    pub winner: PlayerName,
    pub word: WordMatch,
}

/// Where finished games go.
///
/// Rooms call `save` on Tokio's blocking pool, so implementations may do
/// plain synchronous I/O.
pub trait GameStore: Send + Sync + 'static {
    fn save(&self, game: &FinishedGame) -> Result<(), StoreError>;
}

/// Keeps finished games in memory. Useful for tests and for running
/// without a configured store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    games: Mutex<Vec<FinishedGame>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every game saved so far, oldest first.
    pub fn games(&self) -> Vec<FinishedGame> {
        self.games
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.games
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl GameStore for MemoryStore {
    fn save(&self, game: &FinishedGame) -> Result<(), StoreError> {
        self.games
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(game.clone());
        Ok(())
    }
}

/// Appends one JSON object per finished game to a file.
#[derive(Debug)]
pub struct JsonLinesStore {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonLinesStore {
    /// Opens `path` for appending, creating it if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        tracing::info!(path = %path.display(), "finished games will be appended to file");
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl GameStore for JsonLinesStore {
    fn save(&self, game: &FinishedGame) -> Result<(), StoreError> {
        let mut line = serde_json::to_vec(game)?;
        line.push(b'\n');

        let mut file = self
            .file
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        file.write_all(&line)?;
        file.flush()?;
        Ok(())
    }
}
