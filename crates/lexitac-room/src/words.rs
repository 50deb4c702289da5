//! Finding dictionary words on the board.
//!
//! A win is `word_size` consecutive filled cells along a row or a column
//! whose lower-cased letters form a dictionary word. Diagonals don't count.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dictionary::{Dictionary, DictionaryError};
use crate::grid::{Cell, Grid};

/// Which line of the board a word was found on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Line {
    Row(usize),
    Column(usize),
}

/// A word found on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordMatch {
    /// Lower-case word.
    pub word: String,
    pub line: Line,
    /// Offset of the first letter within the line.
    pub start: usize,
}

impl fmt::Display for WordMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Line::Row(x) => write!(f, "{:?} in row {x} at column {}", self.word, self.start),
            Line::Column(y) => write!(f, "{:?} in column {y} at row {}", self.word, self.start),
        }
    }
}

/// Candidate words of one line: every window of exactly `word_size`
/// cells, left to right, as `(start, lower-case word)`. Windows with an
/// empty cell are skipped, never padded.
pub fn candidates(line: &[Cell], word_size: usize) -> impl Iterator<Item = (usize, String)> + '_ {
    // `windows(0)` panics; a zero word size simply has no candidates.
    let windows = (word_size > 0).then(|| line.windows(word_size));
    windows
        .into_iter()
        .flatten()
        .enumerate()
        .filter_map(|(start, window)| {
            window
                .iter()
                .map(|cell| cell.map(|c| c.to_ascii_lowercase()))
                .collect::<Option<String>>()
                .map(|word| (start, word))
        })
}

/// Scans every row, then every column, and returns the first window that
/// is a dictionary word.
///
/// # Errors
/// Propagates the first dictionary failure; the scan stops there.
pub fn find_word(
    grid: &Grid,
    word_size: usize,
    dictionary: &dyn Dictionary,
) -> Result<Option<WordMatch>, DictionaryError> {
    let rows = grid.rows().enumerate().map(|(x, cells)| (Line::Row(x), cells));
    let cols = grid.columns().enumerate().map(|(y, cells)| (Line::Column(y), cells));

    for (line, cells) in rows.chain(cols) {
        for (start, word) in candidates(&cells, word_size) {
            if word.chars().count() == word_size && dictionary.is_word(&word)? {
                return Ok(Some(WordMatch { word, line, start }));
            }
        }
    }
    Ok(None)
}
