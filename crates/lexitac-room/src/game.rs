//! The game instance owned by a room: board, roster, and state machine.
//!
//! Everything here is synchronous and deterministic apart from palette
//! and board generation. The room actor serializes every call, so `Game`
//! itself never needs a lock.

use lexitac_protocol::{GameSnapshot, PlayerName, PlayerView};
use tokio::time::Instant;
use tracing::{debug, info};

use crate::dictionary::{Dictionary, DictionaryError};
use crate::grid::Grid;
use crate::palette::random_palette;
use crate::player::Player;
use crate::words::{WordMatch, find_word};
use crate::{GameConfig, Rejection, RoomState};

/// Seats in a room.
pub const MAX_PLAYERS: usize = 2;

/// One room's game. A departure from a finished game reopens the lobby;
/// only `GameAborted` is final.
#[derive(Debug, Clone)]
pub struct Game {
    config: GameConfig,
    state: RoomState,
    grid: Grid,
    /// Join order.
    players: Vec<Player>,
    winning_word: Option<WordMatch>,
}

impl Game {
    /// A fresh lobby with a newly generated board.
    pub fn new(config: GameConfig) -> Self {
        let config = config.validated();
        let grid = Grid::random(config.grid_size, config.prefill_chance, &mut rand::rng());
        Self {
            config,
            state: RoomState::InLobby,
            grid,
            players: Vec::with_capacity(MAX_PLAYERS),
            winning_word: None,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> RoomState {
        self.state
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Players in join order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, name: &PlayerName) -> Option<&Player> {
        self.players.iter().find(|p| p.name() == name)
    }

    /// The word that ended the game, once it has ended.
    pub fn winning_word(&self) -> Option<&WordMatch> {
        self.winning_word.as_ref()
    }

    // -----------------------------------------------------------------------
    // Roster
    // -----------------------------------------------------------------------

    /// Seats a player with a freshly dealt palette.
    ///
    /// The second player starts the game. Late joins are refused, not
    /// queued.
    pub fn join(&mut self, name: PlayerName) -> Result<Player, Rejection> {
        self.join_at(name, Instant::now())
    }

    pub(crate) fn join_at(&mut self, name: PlayerName, now: Instant) -> Result<Player, Rejection> {
        match self.state {
            RoomState::GameInProgress => return Err(Rejection::RoomFull),
            state if state.is_terminal() => return Err(Rejection::RoomClosed(state)),
            _ => {}
        }
        if self.player(&name).is_some() {
            return Err(Rejection::DuplicatePlayer(name));
        }
        if self.players.len() >= MAX_PLAYERS {
            return Err(Rejection::RoomFull);
        }

        let palette = random_palette(self.config.palette_size, &mut rand::rng());
        let player = Player::new(
            name,
            palette,
            self.config.max_steals,
            self.config.steal_cooldown,
            now,
        );
        self.players.push(player.clone());

        if self.players.len() == MAX_PLAYERS {
            self.state = RoomState::GameInProgress;
        }
        Ok(player)
    }

    /// Removes a player. Unknown names are a no-op.
    ///
    /// An empty room aborts the game. A lone player left behind, whether
    /// the game was running or already won, goes back to the lobby with a
    /// new board and keeps their palette, so the room can be played again.
    pub fn leave(&mut self, name: &PlayerName) -> Option<Player> {
        let index = self.players.iter().position(|p| p.name() == name)?;
        let player = self.players.remove(index);

        if self.players.is_empty() {
            self.state = RoomState::GameAborted;
        } else if self.state != RoomState::GameAborted {
            self.state = RoomState::InLobby;
            self.winning_word = None;
            self.grid = Grid::random(
                self.config.grid_size,
                self.config.prefill_chance,
                &mut rand::rng(),
            );
        }
        Some(player)
    }

    // -----------------------------------------------------------------------
    // Moves
    // -----------------------------------------------------------------------

    /// Refuses anything but a running game.
    pub fn ensure_in_progress(&self) -> Result<(), Rejection> {
        if self.state == RoomState::GameInProgress {
            Ok(())
        } else {
            Err(Rejection::GameNotInProgress(self.state))
        }
    }

    /// Places `letter` at `(x, y)` for `name`.
    ///
    /// Checked in order: known player, cell on the board, cell empty,
    /// letter in the palette, player not locked. The letter stays in the
    /// palette and can be placed again. Turns are not enforced.
    pub fn apply_move(
        &mut self,
        x: usize,
        y: usize,
        name: &PlayerName,
        letter: char,
    ) -> Result<(), Rejection> {
        let player = self
            .player(name)
            .ok_or_else(|| Rejection::UnknownPlayer(name.clone()))?;

        match self.grid.get(x, y) {
            None => return Err(Rejection::OutOfBounds { x, y }),
            Some(Some(_)) => return Err(Rejection::CellOccupied { x, y }),
            Some(None) => {}
        }
        if !player.has_letter(letter) {
            return Err(Rejection::LetterNotInPalette(letter));
        }
        if !player.can_play() {
            return Err(Rejection::PlayerLocked(name.clone()));
        }

        self.grid.place(x, y, letter);
        debug!(player = %name, x, y, %letter, "letter placed");
        Ok(())
    }

    /// Looks for a dictionary word on the board and ends a running game
    /// when one is found.
    ///
    /// Returns whether the board holds a word. Already finished or
    /// abandoned games keep their state.
    ///
    /// # Errors
    /// A failing dictionary leaves the state untouched.
    pub fn check_finished(&mut self, dictionary: &dyn Dictionary) -> Result<bool, DictionaryError> {
        let Some(found) = find_word(&self.grid, self.config.word_size, dictionary)? else {
            return Ok(false);
        };

        if self.state == RoomState::GameInProgress {
            info!(word = %found, "word completed, game ended");
            self.state = RoomState::GameEnded;
            self.winning_word = Some(found);
        }
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Palettes
    // -----------------------------------------------------------------------

    /// `thief` takes the whole palette of `victim`, who is locked out of
    /// placing letters until the next rotation.
    pub fn steal(&mut self, thief: &PlayerName, victim: &PlayerName) -> Result<(), Rejection> {
        self.steal_at(thief, victim, Instant::now())
    }

    pub(crate) fn steal_at(
        &mut self,
        thief: &PlayerName,
        victim: &PlayerName,
        now: Instant,
    ) -> Result<(), Rejection> {
        let thief_idx = self.index_of(thief)?;
        let victim_idx = self.index_of(victim)?;
        if thief_idx == victim_idx {
            return Err(Rejection::CannotStealFromSelf);
        }
        if !self.players[thief_idx].can_play() {
            return Err(Rejection::PlayerLocked(thief.clone()));
        }

        self.players[thief_idx].try_spend_steal(now)?;
        let letters = self.players[victim_idx].surrender_palette();
        self.players[thief_idx].add_to_palette(letters);

        info!(%thief, %victim, "palette stolen");
        Ok(())
    }

    /// Deals every player a new palette and lifts steal locks.
    ///
    /// Does nothing and returns `false` unless the game is running. All
    /// players are updated in one call, never some of them.
    pub fn rotate_palettes(&mut self) -> bool {
        if self.state != RoomState::GameInProgress {
            return false;
        }
        let mut rng = rand::rng();
        for player in &mut self.players {
            player.reset_palette(random_palette(self.config.palette_size, &mut rng));
        }
        true
    }

    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    pub fn player_views(&self) -> Vec<PlayerView> {
        self.players.iter().map(Player::view).collect()
    }

    /// Board plus roster, for broadcasting after a change.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            grid: self.grid.to_rows(),
            players: self.player_views(),
        }
    }

    fn index_of(&self, name: &PlayerName) -> Result<usize, Rejection> {
        self.players
            .iter()
            .position(|p| p.name() == name)
            .ok_or_else(|| Rejection::UnknownPlayer(name.clone()))
    }

    #[cfg(test)]
    pub(crate) fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }
}
