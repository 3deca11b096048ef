//! Trie nodes and the child-table storage strategies they are built from.
//!
//! A node owns three things: a child table keyed by one `char`, a payload
//! (an occurrence count or an optional value), and a live counter holding the
//! number of live entries in the subtree rooted at the node, the node itself
//! included. The live counter is what makes subtree-liveness checks O(1).
//!
//! Storage is an axis independent of behavior:
//! - [`SparseChildren`]: sorted inline vector, accepts every `char`
//! - [`AsciiChildren`]: fixed 128-slot table, accepts only `'\0'..='\x7F'`

use smallvec::SmallVec;

// =============================================================================
// Configuration
// =============================================================================

/// Size of the ASCII child domain.
pub const ASCII_LIMIT: usize = 128;

/// Children kept inline before a sparse table spills to the heap.
const SPARSE_INLINE: usize = 4;

// =============================================================================
// Node ids
// =============================================================================

/// Index of a node inside its trie's node arena.
///
/// The root always has id 0 and is never anyone's child, so child tables may
/// use 0 as their empty marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub(crate) const ROOT: NodeId = NodeId(0);

    /// Id of the node stored at arena slot `index`.
    ///
    /// # Panics
    ///
    /// If `index` does not fit in a `u32`: one trie holds at most
    /// `u32::MAX + 1` nodes.
    #[inline]
    pub(crate) fn from_index(index: usize) -> NodeId {
        match u32::try_from(index) {
            Ok(raw) => NodeId(raw),
            Err(_) => panic!("trie node arena overflow: slot {index} does not fit a u32 node id"),
        }
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

// =============================================================================
// Child tables
// =============================================================================

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::SparseChildren {}
    impl Sealed for super::AsciiChildren {}
}

/// Child storage strategy of a trie node.
///
/// Traversal, counting and compaction are written once against this trait.
/// It is sealed: [`SparseChildren`] and [`AsciiChildren`] are the only
/// strategies.
pub trait ChildTable: Default + sealed::Sealed {
    /// Whether `c` can label an edge in this table.
    fn accepts(c: char) -> bool;

    #[doc(hidden)]
    fn get(&self, c: char) -> Option<NodeId>;

    /// Binds `c` to `child`. `c` must be accepted and not yet bound.
    #[doc(hidden)]
    fn insert(&mut self, c: char, child: NodeId);

    /// Edges in ascending character order.
    #[doc(hidden)]
    fn iter(&self) -> impl Iterator<Item = (char, NodeId)> + '_;
}

/// Sorted sparse child table for arbitrary characters.
#[derive(Clone, Debug, Default)]
pub struct SparseChildren {
    edges: SmallVec<[(char, NodeId); SPARSE_INLINE]>,
}

impl ChildTable for SparseChildren {
    #[inline]
    fn accepts(_c: char) -> bool {
        true
    }

    #[inline]
    fn get(&self, c: char) -> Option<NodeId> {
        self.edges
            .binary_search_by_key(&c, |&(label, _)| label)
            .ok()
            .map(|idx| self.edges[idx].1)
    }

    fn insert(&mut self, c: char, child: NodeId) {
        match self.edges.binary_search_by_key(&c, |&(label, _)| label) {
            Ok(idx) => self.edges[idx].1 = child,
            Err(idx) => self.edges.insert(idx, (c, child)),
        }
    }

    fn iter(&self) -> impl Iterator<Item = (char, NodeId)> + '_ {
        self.edges.iter().copied()
    }
}

/// Fixed 128-slot child table for the ASCII domain.
#[derive(Clone)]
pub struct AsciiChildren {
    /// Slot per code point; 0 is empty (the root is never a child).
    slots: [u32; ASCII_LIMIT],
}

impl Default for AsciiChildren {
    fn default() -> Self {
        Self {
            slots: [0; ASCII_LIMIT],
        }
    }
}

impl std::fmt::Debug for AsciiChildren {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl ChildTable for AsciiChildren {
    #[inline]
    fn accepts(c: char) -> bool {
        (c as u32) < ASCII_LIMIT as u32
    }

    #[inline]
    fn get(&self, c: char) -> Option<NodeId> {
        let slot = *self.slots.get(c as usize)?;
        (slot != 0).then_some(NodeId(slot))
    }

    fn insert(&mut self, c: char, child: NodeId) {
        debug_assert!(Self::accepts(c), "char {c:?} outside the ASCII domain");
        debug_assert_ne!(child, NodeId::ROOT, "the root cannot be a child");
        self.slots[c as usize] = child.0;
    }

    fn iter(&self) -> impl Iterator<Item = (char, NodeId)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|&(_, &slot)| slot != 0)
            .map(|(code, &slot)| (char::from(code as u8), NodeId(slot)))
    }
}

// =============================================================================
// Payloads
// =============================================================================

/// What a node stores for the key ending at it.
pub(crate) trait Payload: Default {
    /// Whether the key ending here is currently present.
    fn is_live(&self) -> bool;
}

/// Occurrence count of a multiset trie.
impl Payload for usize {
    #[inline]
    fn is_live(&self) -> bool {
        *self > 0
    }
}

/// Value slot of a map trie. `Some` is the has-value flag, independent of
/// what the value itself holds.
impl<V> Payload for Option<V> {
    #[inline]
    fn is_live(&self) -> bool {
        self.is_some()
    }
}

// =============================================================================
// Node
// =============================================================================

#[derive(Clone, Debug, Default)]
pub(crate) struct Node<C, P> {
    pub(crate) children: C,
    pub(crate) payload: P,
    /// Live entries in this subtree, this node included. For a counting trie
    /// this is the sum of occurrence counts.
    pub(crate) live: usize,
}
