//! # trie-match
//!
//! Classify and look up short strings (tags, attribute names, filenames,
//! identifiers) against a set of registered rules.
//!
//! ## Building blocks
//!
//! - [`Trie`] / [`AsciiTrie`]: multisets of strings with counting add/remove,
//!   prefix predicates, lazy deletion and explicit [`CountingTrie::compact`]
//! - [`TrieMap`]: single-valued map with longest-stored-prefix lookup
//! - [`glob::to_regex`]: glob to regex source translation
//! - [`Pattern`]: one literal, prefix, suffix, glob or regex rule
//! - [`PatternMap`]: routes rules into six trie indexes plus a glob/regex
//!   scan list and returns the value of the first rule matching a string
//!
//! ## Example
//!
//! ```rust
//! use trie_match::{Pattern, PatternMap};
//!
//! let mut kinds = PatternMap::new();
//! kinds.put(Pattern::literal("Makefile", false), "build");
//! kinds.put(Pattern::suffix(".rs", true), "rust");
//! kinds.put(Pattern::glob("*.{c,h}", false)?, "c");
//!
//! assert_eq!(kinds.get("Makefile"), Some(&"build"));
//! assert_eq!(kinds.get("LIB.RS"), Some(&"rust"));
//! assert_eq!(kinds.get("util.h"), Some(&"c"));
//! assert_eq!(kinds.get("README"), None);
//! # Ok::<(), trie_match::PatternError>(())
//! ```
//!
//! ## Threading
//!
//! Every structure here assumes a single writer and does no locking of its
//! own. To share a [`PatternMap`] across threads, wrap it in one lock per map.

pub mod ascii;
pub mod error;
pub mod glob;
mod node;
pub mod pattern;
pub mod pattern_map;
mod tree;
pub mod trie;
pub mod trie_map;

pub use error::{PatternError, Result};
pub use node::{AsciiChildren, ChildTable, SparseChildren, ASCII_LIMIT};
pub use pattern::{Pattern, PatternKind};
pub use pattern_map::PatternMap;
pub use trie::{AsciiTrie, CountingTrie, Trie};
pub use trie_map::TrieMap;

#[cfg(test)]
mod proptests;
