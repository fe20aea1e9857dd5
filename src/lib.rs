//! # fuzztrie
//!
//! An R-way trie over lowercase ASCII words with per-node letter masks.
//! Supports prefix enumeration and ordered-subsequence ("fuzzy") search,
//! where the masks prune every subtree missing a letter the pattern still
//! needs.
//!
//! ## Example
//!
//! ```rust
//! use fuzztrie::Trie;
//!
//! let mut trie = Trie::new();
//! for word in ["algorithm", "logarithm", "rhythm"] {
//!     trie.add(word).unwrap();
//! }
//!
//! assert_eq!(trie.fuzzy_search("lgrm").unwrap(), vec!["algorithm", "logarithm"]);
//! assert_eq!(trie.prefix_search("rh").unwrap(), vec!["rhythm"]);
//! ```

pub mod dictionary;
pub mod error;
pub mod loader;
pub mod node;
pub mod trie;

#[cfg(test)]
mod proptests;

pub use dictionary::Dictionary;
pub use error::{LoadError, TrieError};
pub use loader::{LoadOptions, LoadReport};
pub use trie::Trie;
