//! Word-membership oracle.
//!
//! The room only ever asks whether a lower-case string is a word, so the
//! oracle is a one-method trait. [`WordList`] is the
//! in-memory implementation backed by a newline-separated file.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

/// Errors raised by a dictionary backend.
#[derive(Debug, thiserror::Error)]
pub enum DictionaryError {
    #[error("failed to read word list {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The backend can't answer right now (remote service down, etc.).
    #[error("dictionary unavailable: {0}")]
    Unavailable(String),
}

/// Answers whether a lower-case string is a word.
pub trait Dictionary: Send + Sync + 'static {
    /// `word` is always lower-case ASCII.
    fn is_word(&self, word: &str) -> Result<bool, DictionaryError>;
}

/// An in-memory set of lower-case words.
#[derive(Debug, Clone, Default)]
pub struct WordList {
    words: HashSet<String>,
}

impl WordList {
    /// Builds a list from any iterator of words; entries are trimmed and
    /// lower-cased, blanks dropped.
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    /// Parses one word per line. Lines starting with `#` are comments.
    pub fn parse(text: &str) -> Self {
        Self::new(text.lines().filter(|line| !line.trim_start().starts_with('#')))
    }

    /// Loads a word list file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DictionaryError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| DictionaryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let list = Self::parse(&text);
        tracing::info!(path = %path.display(), words = list.len(), "word list loaded");
        Ok(list)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Dictionary for WordList {
    fn is_word(&self, word: &str) -> Result<bool, DictionaryError> {
        Ok(self.words.contains(word))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_lowercases_and_trims() {
        let list = WordList::new([" Cat ", "DOG", ""]);
        assert_eq!(list.len(), 2);
        assert!(list.is_word("cat").unwrap());
        assert!(list.is_word("dog").unwrap());
    }

    #[test]
    fn test_parse_skips_comments_and_blank_lines() {
        let list = WordList::parse("# animals\ncat\n\n  # more\nowl\n");
        assert_eq!(list.len(), 2);
        assert!(list.is_word("owl").unwrap());
        assert!(!list.is_word("# animals").unwrap());
    }

    #[test]
    fn test_lookup_is_exact() {
        let list = WordList::new(["cat"]);
        assert!(!list.is_word("cats").unwrap());
        assert!(!list.is_word("ca").unwrap());
    }

    #[test]
    fn test_from_missing_file_is_io_error() {
        let result = WordList::from_file("/definitely/not/here/words.txt");
        assert!(matches!(result, Err(DictionaryError::Io { .. })));
    }

    #[test]
    fn test_from_file_reads_words() {
        let path = std::env::temp_dir().join(format!("lexitac-words-{}.txt", std::process::id()));
        std::fs::write(&path, "apple\nBerry\n").unwrap();

        let list = WordList::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(list.len(), 2);
        assert!(list.is_word("berry").unwrap());
    }
}
