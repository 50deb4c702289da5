//! Core protocol types for Lexitac's wire format.
//!
//! Everything here is serialized to JSON and sent over the network, so
//! field names and `type` tags are part of the client contract.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// An external room identifier, chosen by whoever hands out invite links.
///
/// `#[serde(transparent)]` keeps it a plain JSON string on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "room_{}", self.0)
    }
}

impl From<&str> for RoomId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A player's name inside a room. In practice this is the connection id,
/// so it is opaque and unique per room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerName(pub String);

impl PlayerName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerName {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for PlayerName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// ---------------------------------------------------------------------------
// Recipient
// ---------------------------------------------------------------------------

/// Specifies who in a room should receive a server message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    /// Every player in the room.
    All,
    /// One specific player.
    Player(PlayerName),
    /// Everyone except the given player, e.g. "your opponent left".
    AllExcept(PlayerName),
}

impl Recipient {
    /// Returns `true` if `player` is covered by this recipient.
    pub fn includes(&self, player: &PlayerName) -> bool {
        match self {
            Self::All => true,
            Self::Player(p) => p == player,
            Self::AllExcept(p) => p != player,
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// What other players are allowed to see about a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub name: PlayerName,
    pub palette: Vec<char>,
}

/// Broadcast form of a game: the board plus the roster.
///
/// `grid[x][y]` is row `x`, column `y`; empty cells are `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub grid: Vec<Vec<Option<char>>>,
    pub players: Vec<PlayerView>,
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Client → server messages.
///
/// `#[serde(tag = "type")]` gives `{ "type": "PlaceLetter", "x": 0, ... }`
/// on the wire, which is what the browser client builds by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Must be the first message on a connection.
    JoinRoom { room_id: RoomId },

    /// Put `letter` into cell `(x, y)`.
    PlaceLetter { x: usize, y: usize, letter: char },

    /// Take the whole palette of `victim`.
    StealPalette { victim: PlayerName },

    /// Leave the room (the connection closing has the same effect).
    LeaveRoom,
}

impl ClientMessage {
    /// Checks message-level rules and canonicalizes the payload.
    ///
    /// Letters are accepted in either case and upper-cased, since the
    /// board only ever holds uppercase letters.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidMessage`] for a non-alphabetic
    /// letter or an empty room id.
    pub fn normalized(self) -> Result<Self, ProtocolError> {
        match self {
            Self::PlaceLetter { x, y, letter } => {
                if !letter.is_ascii_alphabetic() {
                    return Err(ProtocolError::InvalidMessage(format!(
                        "letter must be A-Z, got {letter:?}"
                    )));
                }
                Ok(Self::PlaceLetter {
                    x,
                    y,
                    letter: letter.to_ascii_uppercase(),
                })
            }
            Self::JoinRoom { room_id } if room_id.0.trim().is_empty() => Err(
                ProtocolError::InvalidMessage("room_id must not be empty".into()),
            ),
            other => Ok(other),
        }
    }
}

/// Server → client messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Sent to the joining player only.
    Joined { player: PlayerName, palette: Vec<char> },

    /// The second player arrived; full initial state.
    GameStarted { game: GameSnapshot },

    /// A letter was placed.
    GameStateSync { game: GameSnapshot },

    /// Palettes changed, by rotation or by a steal.
    PaletteSync { players: Vec<PlayerView> },

    /// Someone completed a word. `winner` made the final move.
    GameEnded { winner: PlayerName },

    /// A player left the room.
    PlayerDisconnected { player: PlayerName },

    /// A move or steal was refused. Normal gameplay, not a failure.
    Rejected { reason: String },

    /// Protocol-level or server-side failure.
    Error { code: u16, message: String },
}
