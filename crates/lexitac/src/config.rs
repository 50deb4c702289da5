//! Server configuration from environment variables.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use lexitac_room::GameConfig;

use crate::LexitacError;

/// Where to listen, which collaborators to load, and the game rules.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// `LEXITAC_BIND`, default `127.0.0.1:8080`.
    pub bind_addr: String,

    /// `LEXITAC_DICTIONARY`: newline-separated word list.
    pub dictionary_path: Option<PathBuf>,

    /// `LEXITAC_STORE`: JSON-lines file finished games are appended to.
    /// Finished games are kept in memory when unset.
    pub store_path: Option<PathBuf>,

    pub game: GameConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            dictionary_path: None,
            store_path: None,
            game: GameConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Reads the process environment.
    ///
    /// Game overrides: `LEXITAC_GRID_SIZE`, `LEXITAC_WORD_SIZE`,
    /// `LEXITAC_PALETTE_SIZE`, `LEXITAC_ROTATION_SECS`,
    /// `LEXITAC_MAX_STEALS`, `LEXITAC_STEAL_COOLDOWN_SECS`.
    pub fn from_env() -> Result<Self, LexitacError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) but reads variables through
    /// `lookup`.
    ///
    /// # Errors
    /// [`LexitacError::Config`] naming the variable that didn't parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, LexitacError> {
        let mut config = Self::default();

        if let Some(bind) = lookup("LEXITAC_BIND") {
            config.bind_addr = bind;
        }
        config.dictionary_path = lookup("LEXITAC_DICTIONARY").map(PathBuf::from);
        config.store_path = lookup("LEXITAC_STORE").map(PathBuf::from);

        let game = &mut config.game;
        if let Some(size) = parse(&lookup, "LEXITAC_GRID_SIZE")? {
            game.grid_size = size;
        }
        if let Some(size) = parse(&lookup, "LEXITAC_WORD_SIZE")? {
            game.word_size = size;
        }
        if let Some(size) = parse(&lookup, "LEXITAC_PALETTE_SIZE")? {
            game.palette_size = size;
        }
        if let Some(secs) = parse(&lookup, "LEXITAC_ROTATION_SECS")? {
            game.palette_rotation_interval = Duration::from_secs(secs);
        }
        if let Some(steals) = parse(&lookup, "LEXITAC_MAX_STEALS")? {
            game.max_steals = steals;
        }
        if let Some(secs) = parse(&lookup, "LEXITAC_STEAL_COOLDOWN_SECS")? {
            game.steal_cooldown = Duration::from_secs(secs);
        }
        config.game = config.game.validated();

        Ok(config)
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, LexitacError> {
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    raw.trim()
        .parse()
        .map(Some)
        .map_err(|_| LexitacError::Config(format!("{key}: invalid value {raw:?}")))
}
