//! Composite rule engine: patterns routed into per-class indexes.
//!
//! # Lookup order
//! ```text
//! get(s)
//!     → literal  (case-sensitive, then ignore-case)   exact trie lookup
//!     → prefix   (case-sensitive, then ignore-case)   longest stored prefix
//!     → suffix   (case-sensitive, then ignore-case)   longest stored prefix of reversed s
//!     → glob/regex scan list, in insertion order
//!     → first hit wins
//! ```
//!
//! # Design Decisions
//! - The index a pattern lives in is chosen once, on insertion, from its kind
//!   and case flag
//! - Indexed classes answer in O(|s|) however many patterns they hold
//! - Glob and regex patterns cannot be indexed and fall back to a linear scan
//! - Ignore-case indexes store ASCII-folded keys and fold the query the same way

use std::fmt;

use crate::ascii;
use crate::pattern::{Pattern, PatternKind};
use crate::trie_map::TrieMap;

/// How a key index consumes its keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Shape {
    Exact,
    Prefix,
    Suffix,
}

/// Where a pattern is stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Route {
    Indexed { shape: Shape, fold: bool },
    Scan,
}

impl Route {
    fn of(pattern: &Pattern) -> Self {
        let fold = pattern.ignore_case();
        match pattern.kind() {
            PatternKind::Literal => Route::Indexed { shape: Shape::Exact, fold },
            PatternKind::Prefix => Route::Indexed { shape: Shape::Prefix, fold },
            PatternKind::Suffix => Route::Indexed { shape: Shape::Suffix, fold },
            PatternKind::Glob | PatternKind::Regex => Route::Scan,
        }
    }
}

/// Indexed routes in lookup order.
const INDEX_ORDER: [(Shape, bool); 6] = [
    (Shape::Exact, false),
    (Shape::Exact, true),
    (Shape::Prefix, false),
    (Shape::Prefix, true),
    (Shape::Suffix, false),
    (Shape::Suffix, true),
];

#[inline]
fn slot(shape: Shape, fold: bool) -> usize {
    let base = match shape {
        Shape::Exact => 0,
        Shape::Prefix => 2,
        Shape::Suffix => 4,
    };
    base + usize::from(fold)
}

/// One trie-backed index. Suffix indexes key on the reversed expression.
#[derive(Clone)]
struct KeyIndex<V> {
    shape: Shape,
    fold: bool,
    map: TrieMap<V>,
}

impl<V> KeyIndex<V> {
    fn new((shape, fold): (Shape, bool)) -> Self {
        Self {
            shape,
            fold,
            map: TrieMap::new(),
        }
    }

    fn put(&mut self, expression: &str, value: V) -> Option<V> {
        let key = ascii::chars(expression, self.fold);
        match self.shape {
            Shape::Suffix => self.map.put_chars(key.rev(), value),
            Shape::Exact | Shape::Prefix => self.map.put_chars(key, value),
        }
    }

    fn take(&mut self, expression: &str) -> Option<V> {
        let key = ascii::chars(expression, self.fold);
        match self.shape {
            Shape::Suffix => self.map.take_chars(key.rev()),
            Shape::Exact | Shape::Prefix => self.map.take_chars(key),
        }
    }

    fn lookup(&self, s: &str) -> Option<&V> {
        let query = ascii::chars(s, self.fold);
        match self.shape {
            Shape::Exact => self.map.get_chars(query),
            Shape::Prefix => self.map.prefix_of_chars(query),
            Shape::Suffix => self.map.prefix_of_chars(query.rev()),
        }
    }
}

#[derive(Clone)]
struct ScanEntry<V> {
    pattern: Pattern,
    value: V,
}

/// Maps patterns to values and finds the value of the first pattern matching
/// a string.
///
/// ```rust
/// use trie_match::{Pattern, PatternMap};
///
/// let mut rules = PatternMap::new();
/// rules.put(Pattern::literal("abc", false), "A");
/// rules.put(Pattern::prefix("ab", false), "B");
/// rules.put(Pattern::glob("*.{c,h}", true)?, "C");
///
/// assert_eq!(rules.get("abc"), Some(&"A"));
/// assert_eq!(rules.get("abcd"), Some(&"B"));
/// assert_eq!(rules.get("MAIN.C"), Some(&"C"));
/// assert_eq!(rules.get("main.rs"), None);
/// # Ok::<(), trie_match::PatternError>(())
/// ```
pub struct PatternMap<V> {
    indexes: [KeyIndex<V>; 6],
    scan: Vec<ScanEntry<V>>,
}

impl<V> PatternMap<V> {
    pub fn new() -> Self {
        Self {
            indexes: INDEX_ORDER.map(KeyIndex::new),
            scan: Vec::new(),
        }
    }

    /// Binds `pattern` to `value`, returning the value previously bound to an
    /// identical pattern.
    ///
    /// Ignore-case literal, prefix and suffix patterns are identical when
    /// their expressions differ only in ASCII case. An identical glob or regex
    /// pattern keeps its place in the scan order.
    pub fn put(&mut self, pattern: Pattern, value: V) -> Option<V> {
        let route = Route::of(&pattern);
        tracing::trace!(%pattern, ?route, "routing pattern");
        match route {
            Route::Indexed { shape, fold } => {
                self.indexes[slot(shape, fold)].put(pattern.expression(), value)
            }
            Route::Scan => match self.scan.iter_mut().find(|e| e.pattern == pattern) {
                Some(entry) => Some(std::mem::replace(&mut entry.value, value)),
                None => {
                    self.scan.push(ScanEntry { pattern, value });
                    None
                }
            },
        }
    }

    /// Value of the first pattern matching `s`, in lookup order.
    pub fn get(&self, s: &str) -> Option<&V> {
        self.indexes
            .iter()
            .find_map(|index| index.lookup(s))
            .or_else(|| {
                self.scan
                    .iter()
                    .find(|e| e.pattern.matches(s))
                    .map(|e| &e.value)
            })
    }

    /// Unbinds `pattern`, returning its value.
    pub fn remove(&mut self, pattern: &Pattern) -> Option<V> {
        match Route::of(pattern) {
            Route::Indexed { shape, fold } => {
                self.indexes[slot(shape, fold)].take(pattern.expression())
            }
            Route::Scan => {
                let idx = self.scan.iter().position(|e| e.pattern == *pattern)?;
                Some(self.scan.remove(idx).value)
            }
        }
    }

    /// Number of patterns bound, over all indexes.
    pub fn len(&self) -> usize {
        self.indexes.iter().map(|i| i.map.len()).sum::<usize>() + self.scan.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        for index in &mut self.indexes {
            index.map.clear();
        }
        self.scan.clear();
    }

    /// Compacts every index after removals. Returns the number of trie
    /// nodes pruned.
    pub fn compact(&mut self) -> usize {
        self.indexes.iter_mut().map(|i| i.map.compact()).sum()
    }

    /// Glob and regex patterns with their values, in the order they are tried.
    pub fn iter_scan(&self) -> impl Iterator<Item = (&Pattern, &V)> + '_ {
        self.scan.iter().map(|e| (&e.pattern, &e.value))
    }
}

impl<V> Default for PatternMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> Clone for PatternMap<V> {
    fn clone(&self) -> Self {
        Self {
            indexes: self.indexes.clone(),
            scan: self.scan.clone(),
        }
    }
}

impl<V> fmt::Debug for PatternMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let indexed: Vec<usize> = self.indexes.iter().map(|i| i.map.len()).collect();
        f.debug_struct("PatternMap")
            .field("indexed", &indexed)
            .field("scan", &self.scan.len())
            .finish()
    }
}

impl<V> Extend<(Pattern, V)> for PatternMap<V> {
    fn extend<I: IntoIterator<Item = (Pattern, V)>>(&mut self, iter: I) {
        for (pattern, value) in iter {
            self.put(pattern, value);
        }
    }
}

impl<V> FromIterator<(Pattern, V)> for PatternMap<V> {
    fn from_iter<I: IntoIterator<Item = (Pattern, V)>>(iter: I) -> Self {
        let mut m = Self::new();
        m.extend(iter);
        m
    }
}
