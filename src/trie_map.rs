//! Single-valued string map stored as a trie, with longest-prefix lookup.
//!
//! ```rust
//! use trie_match::TrieMap;
//!
//! let mut m = TrieMap::new();
//! m.put("hello", "H");
//! m.put("hellp", "P");
//! assert_eq!(m.get_prefix_of("hello"), Some(&"H"));
//! assert_eq!(m.get_prefix_of("hellp, world"), Some(&"P"));
//! assert_eq!(m.get_prefix_of("hel"), None);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};

use crate::node::{NodeId, SparseChildren};
use crate::tree::Tree;

/// A map from strings to values keyed through a trie.
///
/// Like [`crate::Trie`], removal is lazy: the key's node stays materialized
/// until [`TrieMap::compact`].
pub struct TrieMap<V> {
    pub(crate) tree: Tree<SparseChildren, Option<V>>,
}

impl<V> TrieMap<V> {
    pub fn new() -> Self {
        Self { tree: Tree::new() }
    }

    /// Binds `key` to `value`, returning the previous value.
    pub fn put(&mut self, key: &str, value: V) -> Option<V> {
        self.put_chars(key.chars(), value)
    }

    pub(crate) fn put_chars(&mut self, key: impl IntoIterator<Item = char>, value: V) -> Option<V> {
        let path = self.tree.materialize(key);
        let last = *path.last()?;
        let old = self.tree.node_mut(last).payload.replace(value);
        if old.is_none() {
            self.tree.raise(&path, 1);
        }
        old
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.get_chars(key.chars())
    }

    pub(crate) fn get_chars(&self, key: impl IntoIterator<Item = char>) -> Option<&V> {
        let id = self.tree.find(key)?;
        self.tree.node(id).payload.as_ref()
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let id = self.tree.find(key.chars())?;
        self.tree.node_mut(id).payload.as_mut()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Clears the value of `key`. Returns whether there was one.
    pub fn remove(&mut self, key: &str) -> bool {
        self.take(key).is_some()
    }

    /// Clears the value of `key` and returns it.
    pub fn take(&mut self, key: &str) -> Option<V> {
        self.take_chars(key.chars())
    }

    pub(crate) fn take_chars(&mut self, key: impl IntoIterator<Item = char>) -> Option<V> {
        let path = self.tree.find_path(key)?;
        let last = *path.last()?;
        let old = self.tree.node_mut(last).payload.take()?;
        self.tree.lower(&path, 1);
        Some(old)
    }

    /// Value of the longest stored key that is a prefix of `s`.
    ///
    /// A value stored under the empty key is a prefix of every query.
    pub fn get_prefix_of(&self, s: &str) -> Option<&V> {
        self.prefix_of_chars(s.chars())
    }

    pub(crate) fn prefix_of_chars(&self, s: impl IntoIterator<Item = char>) -> Option<&V> {
        let id = self
            .tree
            .deepest_live_along(s, false)
            .or_else(|| self.tree.root().payload.is_some().then_some(NodeId::ROOT))?;
        self.tree.node(id).payload.as_ref()
    }

    /// Number of keys with a value.
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

    /// Prunes every branch holding no value. Returns the number of nodes
    /// removed.
    pub fn compact(&mut self) -> usize {
        self.tree.compact()
    }

    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Stored entries in ascending character order.
    pub fn iter(&self) -> impl Iterator<Item = (String, &V)> + '_ {
        self.tree
            .entries()
            .filter_map(|(key, slot)| slot.as_ref().map(|v| (key, v)))
    }
}

impl<V> Default for TrieMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> Clone for TrieMap<V> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for TrieMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: AsRef<str>, V> Extend<(K, V)> for TrieMap<V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.put(key.as_ref(), value);
        }
    }
}

impl<K: AsRef<str>, V> FromIterator<(K, V)> for TrieMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut m = Self::new();
        m.extend(iter);
        m
    }
}

impl<V: Serialize> Serialize for TrieMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for TrieMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = BTreeMap::<String, V>::deserialize(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}
