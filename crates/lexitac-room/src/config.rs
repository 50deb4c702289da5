//! Game configuration and the room state machine.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::palette::ALPHABET_LEN;

// ---------------------------------------------------------------------------
// GameConfig
// ---------------------------------------------------------------------------

/// Settings for one game instance. Every room in a registry shares one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Width and height of the square board.
    pub grid_size: usize,

    /// Exact length of the words that win.
    pub word_size: usize,

    /// Letters dealt to each player per rotation (at most 26, all distinct).
    pub palette_size: usize,

    /// Time between palette rotations while a game is running.
    /// `Duration::ZERO` turns rotation off.
    pub palette_rotation_interval: Duration,

    /// Steal charges each player starts with.
    pub max_steals: u32,

    /// Minimum time between two steals by the same player. The first
    /// steal is also gated, counting from when the player joined.
    pub steal_cooldown: Duration,

    /// Probability (0.0–1.0) that a cell of a freshly generated board
    /// starts out holding a random letter.
    pub prefill_chance: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_size: 10,
            word_size: 5,
            palette_size: 10,
            palette_rotation_interval: Duration::from_secs(10),
            max_steals: 5,
            steal_cooldown: Duration::from_secs(20),
            prefill_chance: 0.0,
        }
    }
}

impl GameConfig {
    /// Clamp out-of-range values so the config is safe to use.
    ///
    /// Rules:
    /// - `grid_size` at least 1.
    /// - `word_size` within `1..=grid_size`.
    /// - `palette_size` within `1..=26`.
    /// - `prefill_chance` within `0.0..=1.0`.
    pub fn validated(mut self) -> Self {
        if self.grid_size == 0 {
            warn!("grid_size is 0, using 1");
            self.grid_size = 1;
        }
        if self.word_size == 0 || self.word_size > self.grid_size {
            let clamped = self.word_size.clamp(1, self.grid_size);
            warn!(
                word_size = self.word_size,
                grid_size = self.grid_size,
                clamped,
                "word_size out of range, clamping"
            );
            self.word_size = clamped;
        }
        if self.palette_size == 0 || self.palette_size > ALPHABET_LEN {
            let clamped = self.palette_size.clamp(1, ALPHABET_LEN);
            warn!(palette_size = self.palette_size, clamped, "palette_size out of range, clamping");
            self.palette_size = clamped;
        }
        if !(0.0..=1.0).contains(&self.prefill_chance) {
            // NaN lands here too and becomes an empty board.
            let clamped = if self.prefill_chance > 1.0 { 1.0 } else { 0.0 };
            warn!(prefill_chance = self.prefill_chance, clamped, "prefill_chance out of range");
            self.prefill_chance = clamped;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// RoomState
// ---------------------------------------------------------------------------

/// The lifecycle state of a room's game.
///
/// ```text
///              join (2nd player)
/// InLobby ─────────────────────────→ GameInProgress ──(word found)──→ GameEnded
///    ↑                                     │                             │
///    └────────(one player leaves)──────────┴─────────────────────────────┘
///
/// any state ──(last player leaves)──→ GameAborted
/// ```
///
/// `GameEnded` accepts no moves or joins; once the loser or the winner
/// leaves, the one left waits in the lobby for a new opponent.
/// `GameAborted` is final: the room id goes to a fresh instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomState {
    InLobby,
    GameInProgress,
    GameEnded,
    GameAborted,
}

impl RoomState {
    /// Returns `true` if a new player may join.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::InLobby)
    }

    /// Returns `true` once the game instance can never run again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::GameEnded | Self::GameAborted)
    }
}

impl fmt::Display for RoomState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InLobby => "IN_LOBBY",
            Self::GameInProgress => "GAME_IN_PROGRESS",
            Self::GameEnded => "GAME_ENDED",
            Self::GameAborted => "GAME_ABORTED",
        };
        f.write_str(name)
    }
}
