use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by trie operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TrieError {
    /// A key or query contains something other than lowercase `a`-`z`.
    #[error("unsupported character {character:?} at position {position}")]
    UnsupportedCharacter { character: char, position: usize },

    /// The key passed to `remove` is not stored in the trie.
    #[error("key not found: {0:?}")]
    KeyNotFound(String),
}

/// Errors raised while bulk loading words from a line-oriented source.
///
/// A failed load never touches the trie it was loading into.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open word list {}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read line {line}")]
    Read {
        line: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid word {word:?} on line {line}")]
    InvalidWord {
        line: usize,
        word: String,
        #[source]
        source: TrieError,
    },
}
