//! Outcomes of player actions.
//!
//! Breaking a game rule is normal play, not a failure: the action is
//! refused and nothing changes. Those refusals are [`Rejection`]s, kept
//! apart from [`RoomError`](crate::RoomError), which only covers failing
//! collaborators.

use std::fmt;

use lexitac_protocol::PlayerName;

use crate::RoomState;

/// Why an action was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Both seats are taken and the game is running.
    RoomFull,
    /// The game instance is over and takes no more players.
    RoomClosed(RoomState),
    /// A player with this name is already in the room.
    DuplicatePlayer(PlayerName),
    UnknownPlayer(PlayerName),
    /// Moves and steals need a running game.
    GameNotInProgress(RoomState),
    OutOfBounds { x: usize, y: usize },
    CellOccupied { x: usize, y: usize },
    LetterNotInPalette(char),
    /// The player's palette was stolen and hasn't been rotated back yet.
    PlayerLocked(PlayerName),
    CannotStealFromSelf,
    NoStealsLeft,
    StealOnCooldown,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RoomFull => f.write_str("room is full"),
            Self::RoomClosed(state) => write!(f, "room is closed ({state})"),
            Self::DuplicatePlayer(name) => write!(f, "player {name} is already in the room"),
            Self::UnknownPlayer(name) => write!(f, "no player named {name} in the room"),
            Self::GameNotInProgress(state) => write!(f, "game is not in progress ({state})"),
            Self::OutOfBounds { x, y } => write!(f, "cell ({x}, {y}) is off the board"),
            Self::CellOccupied { x, y } => write!(f, "cell ({x}, {y}) is occupied"),
            Self::LetterNotInPalette(letter) => write!(f, "{letter} is not in your palette"),
            Self::PlayerLocked(name) => write!(f, "player {name} is locked until the next rotation"),
            Self::CannotStealFromSelf => f.write_str("cannot steal your own palette"),
            Self::NoStealsLeft => f.write_str("no steals left"),
            Self::StealOnCooldown => f.write_str("steal is on cooldown"),
        }
    }
}

/// Accepted-or-rejected result of an action routed through a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict<T> {
    Accepted(T),
    Rejected(Rejection),
}

impl<T> Verdict<T> {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    pub fn accepted(self) -> Option<T> {
        match self {
            Self::Accepted(value) => Some(value),
            Self::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Accepted(_) => None,
            Self::Rejected(reason) => Some(reason),
        }
    }
}

impl<T> From<Result<T, Rejection>> for Verdict<T> {
    fn from(result: Result<T, Rejection>) -> Self {
        match result {
            Ok(value) => Self::Accepted(value),
            Err(reason) => Self::Rejected(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_from_result() {
        let ok: Verdict<u8> = Ok(3).into();
        assert!(ok.is_accepted());
        assert_eq!(ok.accepted(), Some(3));

        let rejected: Verdict<u8> = Err(Rejection::RoomFull).into();
        assert!(!rejected.is_accepted());
        assert_eq!(rejected.rejection(), Some(&Rejection::RoomFull));
    }

    #[test]
    fn test_rejection_messages_are_client_readable() {
        assert_eq!(
            Rejection::CellOccupied { x: 1, y: 2 }.to_string(),
            "cell (1, 2) is occupied"
        );
        assert_eq!(
            Rejection::GameNotInProgress(RoomState::InLobby).to_string(),
            "game is not in progress (IN_LOBBY)"
        );
    }
}
