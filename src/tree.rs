//! Arena-backed trie shared by the counting tries and the trie map.
//!
//! Nodes live in one `Vec` and refer to each other by [`NodeId`]. They are
//! created on demand and never freed individually: removal only lowers counts
//! and live counters, and [`Tree::compact`] rebuilds the live part of the tree
//! into a fresh arena in one batched pass.

use smallvec::SmallVec;

use crate::node::{ChildTable, Node, NodeId, Payload};

/// Path lengths kept inline before a walk spills to the heap.
const PATH_INLINE: usize = 32;

/// Node ids from the root (inclusive) down to a key's terminal node.
pub(crate) type Path = SmallVec<[NodeId; PATH_INLINE]>;

#[derive(Clone, Debug)]
pub(crate) struct Tree<C, P> {
    nodes: Vec<Node<C, P>>,
}

impl<C: ChildTable, P: Payload> Tree<C, P> {
    pub(crate) fn new() -> Self {
        Self {
            nodes: vec![Node::default()],
        }
    }

    /// Whether every char of `key` can label an edge of this tree.
    #[inline]
    pub(crate) fn in_domain(key: &str) -> bool {
        key.chars().all(C::accepts)
    }

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &Node<C, P> {
        &self.nodes[id.index()]
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<C, P> {
        &mut self.nodes[id.index()]
    }

    #[inline]
    pub(crate) fn root(&self) -> &Node<C, P> {
        self.node(NodeId::ROOT)
    }

    pub(crate) fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.nodes.push(Node::default());
    }

    /// Terminal node of `key`, if it has been materialized.
    pub(crate) fn find(&self, key: impl IntoIterator<Item = char>) -> Option<NodeId> {
        let mut current = NodeId::ROOT;
        for c in key {
            current = self.node(current).children.get(c)?;
        }
        Some(current)
    }

    /// Like [`Tree::find`], but records every node visited.
    pub(crate) fn find_path(&self, key: impl IntoIterator<Item = char>) -> Option<Path> {
        let mut path = Path::new();
        path.push(NodeId::ROOT);
        let mut current = NodeId::ROOT;
        for c in key {
            current = self.node(current).children.get(c)?;
            path.push(current);
        }
        Some(path)
    }

    /// Walks `key` creating missing nodes and returns the full path. Every
    /// char must be accepted by `C`; callers validate the domain first.
    pub(crate) fn materialize(&mut self, key: impl IntoIterator<Item = char>) -> Path {
        let mut path = Path::new();
        path.push(NodeId::ROOT);
        let mut current = NodeId::ROOT;
        for c in key {
            current = match self.node(current).children.get(c) {
                Some(next) => next,
                None => {
                    let next = NodeId::from_index(self.nodes.len());
                    self.nodes.push(Node::default());
                    self.node_mut(current).children.insert(c, next);
                    next
                }
            };
            path.push(current);
        }
        path
    }

    /// Adds `n` live entries to every node on `path`.
    pub(crate) fn raise(&mut self, path: &[NodeId], n: usize) {
        for &id in path {
            self.node_mut(id).live += n;
        }
    }

    /// Removes `n` live entries from every node on `path`.
    pub(crate) fn lower(&mut self, path: &[NodeId], n: usize) {
        for &id in path {
            let node = self.node_mut(id);
            debug_assert!(node.live >= n, "live counter underflow");
            node.live -= n;
        }
    }

    /// Walks `query` from the root and returns the deepest node, at depth 1 or
    /// more, whose payload is live. With `first_only` the walk stops at the
    /// first such node instead.
    pub(crate) fn deepest_live_along(
        &self,
        query: impl IntoIterator<Item = char>,
        first_only: bool,
    ) -> Option<NodeId> {
        let mut best = None;
        let mut current = NodeId::ROOT;
        for c in query {
            current = match self.node(current).children.get(c) {
                Some(next) => next,
                None => break,
            };
            if self.node(current).payload.is_live() {
                best = Some(current);
                if first_only {
                    break;
                }
            }
        }
        best
    }

    /// Rebuilds the arena keeping only the root and nodes with a live
    /// subtree. Returns how many nodes were pruned.
    pub(crate) fn compact(&mut self) -> usize {
        let before = self.nodes.len();

        let mut old = std::mem::take(&mut self.nodes);
        let live_nodes = old.iter().filter(|n| n.live > 0).count();
        let mut fresh: Vec<Node<C, P>> = Vec::with_capacity(live_nodes + 1);

        let root = &mut old[NodeId::ROOT.index()];
        fresh.push(Node {
            children: C::default(),
            payload: std::mem::take(&mut root.payload),
            live: root.live,
        });

        // (old id, new id) pairs whose children still need copying.
        let mut stack: Vec<(NodeId, NodeId)> = vec![(NodeId::ROOT, NodeId::ROOT)];
        while let Some((old_id, new_id)) = stack.pop() {
            let edges: SmallVec<[(char, NodeId); 8]> = old[old_id.index()]
                .children
                .iter()
                .filter(|&(_, child)| old[child.index()].live > 0)
                .collect();

            for (c, old_child) in edges {
                let node = &mut old[old_child.index()];
                let new_child = NodeId::from_index(fresh.len());
                fresh.push(Node {
                    children: C::default(),
                    payload: std::mem::take(&mut node.payload),
                    live: node.live,
                });
                fresh[new_id.index()].children.insert(c, new_child);
                stack.push((old_child, new_child));
            }
        }

        self.nodes = fresh;
        let pruned = before - self.nodes.len();
        tracing::debug!(before, after = self.nodes.len(), pruned, "compacted trie");
        pruned
    }

    /// Live entries in ascending character order.
    pub(crate) fn entries(&self) -> Entries<'_, C, P> {
        let mut stack = Vec::new();
        if self.root().live > 0 {
            stack.push((NodeId::ROOT, String::new()));
        }
        Entries { tree: self, stack }
    }
}

pub(crate) struct Entries<'a, C, P> {
    tree: &'a Tree<C, P>,
    /// Pending subtrees with the key spelled by the path to them.
    stack: Vec<(NodeId, String)>,
}

impl<'a, C: ChildTable, P: Payload> Iterator for Entries<'a, C, P> {
    type Item = (String, &'a P);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((id, key)) = self.stack.pop() {
            let node = self.tree.node(id);

            let children: SmallVec<[(char, NodeId); 8]> = node.children.iter().collect();
            for &(c, child) in children.iter().rev() {
                if self.tree.node(child).live > 0 {
                    let mut child_key = key.clone();
                    child_key.push(c);
                    self.stack.push((child, child_key));
                }
            }

            if node.payload.is_live() {
                return Some((key, &node.payload));
            }
        }
        None
    }
}
