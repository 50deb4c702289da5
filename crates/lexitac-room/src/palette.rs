//! Random letter palettes.

use rand::Rng;
use rand::seq::SliceRandom;

/// Number of letters a palette can draw from.
pub const ALPHABET_LEN: usize = 26;

/// Draws `size` distinct uppercase letters in random order.
///
/// `size` above 26 yields the whole alphabet, shuffled.
pub fn random_palette<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Vec<char> {
    let mut letters: Vec<char> = ('A'..='Z').collect();
    letters.shuffle(rng);
    letters.truncate(size.min(ALPHABET_LEN));
    letters
}

/// A single random uppercase letter.
pub fn random_letter<R: Rng + ?Sized>(rng: &mut R) -> char {
    let offset = rng.random_range(0..ALPHABET_LEN as u8);
    char::from(b'A' + offset)
}
