//! Multiset tries: occurrence counting, prefix predicates, lazy deletion.
//!
//! [`Trie`] accepts any `char`. [`AsciiTrie`] stores children in a fixed
//! 128-slot table and treats a key with any char above `'\x7F'` as one that
//! can never be present: `add` refuses it without touching the tree and every
//! query answers as for a never-inserted key.
//!
//! ```rust
//! use trie_match::Trie;
//!
//! let mut t = Trie::new();
//! t.add("tag");
//! t.add("tag");
//! assert_eq!(t.count("tag"), 2);
//! assert!(t.contains_prefix("ta"));
//! assert!(t.contains_prefix_of("tags"));
//!
//! t.remove_all("tag");
//! assert!(t.is_empty());
//! // The nodes stay until compaction.
//! assert_eq!(t.node_count(), 4);
//! t.compact();
//! assert_eq!(t.node_count(), 1);
//! ```

use std::fmt;

use serde::de::{Deserialize, Deserializer, Error as _};
use serde::ser::{Serialize, Serializer};

use crate::node::{AsciiChildren, ChildTable, SparseChildren};
use crate::tree::Tree;

/// Counting trie over arbitrary characters.
pub type Trie = CountingTrie<SparseChildren>;

/// Counting trie restricted to the ASCII domain.
pub type AsciiTrie = CountingTrie<AsciiChildren>;

/// A multiset of strings stored as a trie, generic over child storage.
///
/// Removal never deletes nodes; dead branches are pruned by
/// [`CountingTrie::compact`].
pub struct CountingTrie<C> {
    pub(crate) tree: Tree<C, usize>,
}

impl<C: ChildTable> CountingTrie<C> {
    pub fn new() -> Self {
        Self { tree: Tree::new() }
    }

    /// Adds one occurrence of `key`.
    ///
    /// Returns `false`, leaving the trie untouched, if any char of `key` is
    /// outside the storage domain.
    pub fn add(&mut self, key: &str) -> bool {
        self.add_n(key, 1)
    }

    fn add_n(&mut self, key: &str, n: usize) -> bool {
        if !Tree::<C, usize>::in_domain(key) {
            return false;
        }
        let path = self.tree.materialize(key.chars());
        self.tree.raise(&path, n);
        if let Some(&last) = path.last() {
            self.tree.node_mut(last).payload += n;
        }
        true
    }

    /// Removes one occurrence of `key`. Returns whether one was present.
    pub fn remove(&mut self, key: &str) -> bool {
        self.remove_up_to(key, 1)
    }

    /// Removes every occurrence of `key`. Returns whether any was present.
    pub fn remove_all(&mut self, key: &str) -> bool {
        self.remove_up_to(key, usize::MAX)
    }

    fn remove_up_to(&mut self, key: &str, limit: usize) -> bool {
        if !Tree::<C, usize>::in_domain(key) {
            return false;
        }
        let Some(path) = self.tree.find_path(key.chars()) else {
            return false;
        };
        let Some(&last) = path.last() else {
            return false;
        };
        let n = self.tree.node(last).payload.min(limit);
        if n == 0 {
            return false;
        }
        self.tree.node_mut(last).payload -= n;
        self.tree.lower(&path, n);
        true
    }

    pub fn contains(&self, key: &str) -> bool {
        self.count(key) > 0
    }

    /// Occurrences of `key`; 0 if absent or outside the domain.
    pub fn count(&self, key: &str) -> usize {
        if !Tree::<C, usize>::in_domain(key) {
            return 0;
        }
        self.tree
            .find(key.chars())
            .map_or(0, |id| self.tree.node(id).payload)
    }

    /// Whether some present key starts with `prefix`.
    pub fn contains_prefix(&self, prefix: &str) -> bool {
        if !Tree::<C, usize>::in_domain(prefix) {
            return false;
        }
        self.tree
            .find(prefix.chars())
            .is_some_and(|id| self.tree.node(id).live > 0)
    }

    /// Whether some present, non-empty key is a prefix of `s`.
    ///
    /// A stored empty key never satisfies this, not even for `s == ""`.
    pub fn contains_prefix_of(&self, s: &str) -> bool {
        if !Tree::<C, usize>::in_domain(s) {
            return false;
        }
        self.tree.deepest_live_along(s.chars(), true).is_some()
    }

    /// Total occurrences over all keys.
    pub fn len(&self) -> usize {
        self.tree.root().live
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Materialized nodes, the root included.
    pub fn node_count(&self) -> usize {
        self.tree.node_count()
    }

    /// Prunes every branch holding no present key. Returns the number of
    /// nodes removed; a second consecutive call removes nothing.
    pub fn compact(&mut self) -> usize {
        self.tree.compact()
    }

    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Present keys with their counts, in ascending character order.
    pub fn iter(&self) -> impl Iterator<Item = (String, usize)> + '_ {
        self.tree.entries().map(|(key, &count)| (key, count))
    }
}

impl<C: ChildTable> Default for CountingTrie<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ChildTable + Clone> Clone for CountingTrie<C> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
        }
    }
}

impl<C: ChildTable> fmt::Debug for CountingTrie<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, C: ChildTable> Extend<&'a str> for CountingTrie<C> {
    fn extend<I: IntoIterator<Item = &'a str>>(&mut self, iter: I) {
        for key in iter {
            self.add(key);
        }
    }
}

impl<'a, C: ChildTable> FromIterator<&'a str> for CountingTrie<C> {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut t = Self::new();
        t.extend(iter);
        t
    }
}

impl<C: ChildTable> Serialize for CountingTrie<C> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

impl<'de, C: ChildTable> Deserialize<'de> for CountingTrie<C> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let counts = std::collections::BTreeMap::<String, usize>::deserialize(deserializer)?;
        let mut t = Self::new();
        let mut total = 0usize;
        for (key, count) in counts {
            if count == 0 {
                continue;
            }
            // Every live counter is bounded by the root's, which is the total.
            total = total
                .checked_add(count)
                .ok_or_else(|| D::Error::custom("total occurrence count overflows usize"))?;
            if !t.add_n(&key, count) {
                return Err(D::Error::custom(format_args!(
                    "key {key:?} is outside the trie's character domain"
                )));
            }
        }
        Ok(t)
    }
}
