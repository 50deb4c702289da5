//! A player seated in a room: palette, lock state, and steal charges.

use std::time::Duration;

use lexitac_protocol::{PlayerName, PlayerView};
use tokio::time::Instant;

use crate::Rejection;

/// A seated player.
///
/// Equality is by name only: two records with the same name are the same
/// player, whatever their palettes say.
#[derive(Debug, Clone)]
pub struct Player {
    name: PlayerName,
    palette: Vec<char>,
    can_play: bool,
    steal_amount: u32,
    steal_cooldown: Duration,
    last_steal_time: Instant,
}

impl PartialEq for Player {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Player {}

impl Player {
    /// A new player. The steal cooldown starts running at `now`, so the
    /// first steal is possible one cooldown after joining.
    pub fn new(
        name: PlayerName,
        palette: Vec<char>,
        steal_amount: u32,
        steal_cooldown: Duration,
        now: Instant,
    ) -> Self {
        Self {
            name,
            palette,
            can_play: true,
            steal_amount,
            steal_cooldown,
            last_steal_time: now,
        }
    }

    pub fn name(&self) -> &PlayerName {
        &self.name
    }

    /// Letters this player may place. May contain duplicates after a steal.
    pub fn palette(&self) -> &[char] {
        &self.palette
    }

    /// `false` while locked out by a steal.
    pub fn can_play(&self) -> bool {
        self.can_play
    }

    pub fn steal_amount(&self) -> u32 {
        self.steal_amount
    }

    pub fn last_steal_time(&self) -> Instant {
        self.last_steal_time
    }

    pub fn has_letter(&self, letter: char) -> bool {
        self.palette.contains(&letter)
    }

    /// Checks the steal gate and, if it passes, spends one charge.
    ///
    /// The charge and the timestamp are only touched on success.
    pub(crate) fn try_spend_steal(&mut self, now: Instant) -> Result<(), Rejection> {
        if self.steal_amount == 0 {
            return Err(Rejection::NoStealsLeft);
        }
        if now.saturating_duration_since(self.last_steal_time) < self.steal_cooldown {
            return Err(Rejection::StealOnCooldown);
        }
        self.steal_amount -= 1;
        self.last_steal_time = now;
        Ok(())
    }

    /// Empties the palette and locks the player out of placing letters.
    pub(crate) fn surrender_palette(&mut self) -> Vec<char> {
        self.can_play = false;
        std::mem::take(&mut self.palette)
    }

    pub(crate) fn add_to_palette(&mut self, letters: Vec<char>) {
        self.palette.extend(letters);
    }

    /// Deals a new palette and lifts any steal lock.
    pub(crate) fn reset_palette(&mut self, palette: Vec<char>) {
        self.palette = palette;
        self.can_play = true;
    }

    pub fn view(&self) -> PlayerView {
        PlayerView {
            name: self.name.clone(),
            palette: self.palette.clone(),
        }
    }
}
