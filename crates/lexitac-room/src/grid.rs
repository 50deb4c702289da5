//! The square letter board and row/column extraction.

use rand::Rng;

use crate::palette::random_letter;

/// One board cell: empty, or a single uppercase letter.
pub type Cell = Option<char>;

/// An N×N board. `(x, y)` addresses row `x`, column `y`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    size: usize,
    cells: Vec<Vec<Cell>>,
}

impl Grid {
    /// An all-empty board.
    pub fn empty(size: usize) -> Self {
        Self {
            size,
            cells: vec![vec![None; size]; size],
        }
    }

    /// A fresh board where each cell independently starts with a random
    /// letter with probability `prefill_chance`.
    pub fn random<R: Rng + ?Sized>(size: usize, prefill_chance: f64, rng: &mut R) -> Self {
        let mut grid = Self::empty(size);
        if prefill_chance <= 0.0 {
            return grid;
        }
        for row in &mut grid.cells {
            for cell in row.iter_mut() {
                if rng.random_bool(prefill_chance.min(1.0)) {
                    *cell = Some(random_letter(rng));
                }
            }
        }
        grid
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// `None` when `(x, y)` is off the board.
    pub fn get(&self, x: usize, y: usize) -> Option<Cell> {
        self.cells.get(x)?.get(y).copied()
    }

    /// `true` only for an in-bounds, empty cell.
    pub fn is_vacant(&self, x: usize, y: usize) -> bool {
        matches!(self.get(x, y), Some(None))
    }

    /// Writes `letter` into `(x, y)`. Callers check bounds and vacancy
    /// first; an out-of-bounds write is ignored.
    pub(crate) fn place(&mut self, x: usize, y: usize, letter: char) {
        if let Some(cell) = self.cells.get_mut(x).and_then(|row| row.get_mut(y)) {
            *cell = Some(letter);
        }
    }

    /// Every row, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = Vec<Cell>> + '_ {
        self.cells.iter().cloned()
    }

    /// Every column, left to right, each read top to bottom.
    pub fn columns(&self) -> impl Iterator<Item = Vec<Cell>> + '_ {
        (0..self.size).map(move |y| self.cells.iter().map(|row| row[y]).collect())
    }

    /// `true` when no cell holds a letter.
    pub fn is_blank(&self) -> bool {
        self.cells.iter().flatten().all(Option::is_none)
    }

    /// Row-major copy of the cells, the shape used on the wire.
    pub fn to_rows(&self) -> Vec<Vec<Cell>> {
        self.cells.clone()
    }
}
