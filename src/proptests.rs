use crate::node::{NodeId, Payload};
use crate::tree::Tree;
use crate::{AsciiChildren, AsciiTrie, ChildTable, CountingTrie, SparseChildren, TrieMap};

use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

/// Checks the live counters of every node and that every node is reachable.
/// With `compacted`, also checks that no dead branch survived.
fn validate_tree<C: ChildTable, P: Payload>(
    t: &Tree<C, P>,
    weight: impl Fn(&P) -> usize,
    compacted: bool,
) {
    let mut reachable = 0usize;
    let mut stack = vec![NodeId::ROOT];
    while let Some(id) = stack.pop() {
        reachable += 1;
        let node = t.node(id);

        let mut expected = weight(&node.payload);
        for (_, child) in node.children.iter() {
            assert_ne!(child, NodeId::ROOT, "root must not be a child");
            expected += t.node(child).live;
            stack.push(child);
        }
        assert_eq!(node.live, expected, "live counter of {id:?} out of sync");

        if compacted && id != NodeId::ROOT {
            assert!(node.live > 0, "dead node {id:?} survived compaction");
        }
    }
    assert_eq!(reachable, t.node_count(), "unreachable nodes in arena");
}

/// Nodes needed to store `keys` with maximal prefix sharing, root included.
fn minimal_node_count<'a>(keys: impl IntoIterator<Item = &'a String>) -> usize {
    let mut prefixes: BTreeSet<Vec<char>> = BTreeSet::new();
    for key in keys {
        let chars: Vec<char> = key.chars().collect();
        for end in 1..=chars.len() {
            prefixes.insert(chars[..end].to_vec());
        }
    }
    prefixes.len() + 1
}

#[derive(Clone, Debug)]
enum Op {
    Add(String),
    Remove(String),
    RemoveAll(String),
    Query(String),
    Compact,
}

fn key_strategy() -> impl Strategy<Value = String> + Clone {
    // A small alphabet keeps keys colliding and sharing prefixes. 'é' and '日'
    // exercise both the sparse table and the ASCII domain check.
    prop::collection::vec(prop::sample::select(vec!['a', 'b', 'c', 'é', '日']), 0..=6)
        .prop_map(|chars| chars.into_iter().collect())
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let key = key_strategy();
    let op = prop_oneof![
        40 => key.clone().prop_map(Op::Add),
        25 => key.clone().prop_map(Op::Remove),
        5 => key.clone().prop_map(Op::RemoveAll),
        28 => key.clone().prop_map(Op::Query),
        2 => Just(Op::Compact),
    ];
    prop::collection::vec(op, 0..=400)
}

fn in_ascii(key: &str) -> bool {
    key.is_ascii()
}

/// Runs `ops` against a counting trie and a multiset model. `domain` filters
/// which keys the trie is able to hold.
fn check_counting<C: ChildTable>(
    ops: Vec<Op>,
    domain: fn(&str) -> bool,
) -> std::result::Result<(), TestCaseError> {
    let mut t: CountingTrie<C> = CountingTrie::new();
    let mut m: BTreeMap<String, usize> = BTreeMap::new();
    let mut last_nodes = t.node_count();

    for op in ops {
        let mut compacted = false;
        match op {
            Op::Add(key) => {
                let accepted = domain(&key);
                prop_assert_eq!(t.add(&key), accepted);
                if accepted {
                    *m.entry(key).or_default() += 1;
                }
            }
            Op::Remove(key) => {
                let present = m.get(&key).is_some_and(|&c| c > 0);
                prop_assert_eq!(t.remove(&key), present);
                if present {
                    *m.get_mut(&key).unwrap() -= 1;
                }
            }
            Op::RemoveAll(key) => {
                let present = m.get(&key).is_some_and(|&c| c > 0);
                prop_assert_eq!(t.remove_all(&key), present);
                m.remove(&key);
            }
            Op::Query(key) => {
                let count = m.get(&key).copied().unwrap_or(0);
                prop_assert_eq!(t.count(&key), count);
                prop_assert_eq!(t.contains(&key), count > 0);

                let has_prefix = domain(&key)
                    && m.iter().any(|(k, &c)| c > 0 && k.starts_with(key.as_str()));
                prop_assert_eq!(t.contains_prefix(&key), has_prefix);

                let has_prefix_of = domain(&key)
                    && m.iter().any(|(k, &c)| c > 0 && !k.is_empty() && key.starts_with(k.as_str()));
                prop_assert_eq!(t.contains_prefix_of(&key), has_prefix_of);
            }
            Op::Compact => {
                t.compact();
                compacted = true;
                let live = m.iter().filter(|(_, &c)| c > 0).map(|(k, _)| k);
                prop_assert_eq!(t.node_count(), minimal_node_count(live));
                prop_assert_eq!(t.compact(), 0);
            }
        }

        if !compacted {
            prop_assert!(t.node_count() >= last_nodes, "node count shrank without compaction");
        }
        last_nodes = t.node_count();
        prop_assert_eq!(t.len(), m.values().sum::<usize>());
        validate_tree(&t.tree, |&c| c, compacted);
    }

    let got: Vec<(String, usize)> = t.iter().collect();
    let expected: Vec<(String, usize)> = m.into_iter().filter(|&(_, c)| c > 0).collect();
    prop_assert_eq!(got, expected);
    Ok(())
}

fn map_ops_strategy() -> impl Strategy<Value = Vec<(Op, u32)>> {
    prop::collection::vec((ops_strategy_single(), any::<u32>()), 0..=400)
}

fn ops_strategy_single() -> impl Strategy<Value = Op> {
    let key = key_strategy();
    prop_oneof![
        45 => key.clone().prop_map(Op::Add),
        25 => key.clone().prop_map(Op::Remove),
        28 => key.clone().prop_map(Op::Query),
        2 => Just(Op::Compact),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_trie_equivalence(ops in ops_strategy()) {
        check_counting::<SparseChildren>(ops, |_| true)?;
    }

    #[test]
    fn prop_ascii_trie_equivalence(ops in ops_strategy()) {
        check_counting::<AsciiChildren>(ops, in_ascii)?;
    }

    #[test]
    fn prop_trie_map_equivalence(ops in map_ops_strategy()) {
        let mut t: TrieMap<u32> = TrieMap::new();
        let mut m: BTreeMap<String, u32> = BTreeMap::new();

        for (op, value) in ops {
            let mut compacted = false;
            match op {
                Op::Add(key) => {
                    prop_assert_eq!(t.put(&key, value), m.insert(key, value));
                }
                Op::Remove(key) | Op::RemoveAll(key) => {
                    prop_assert_eq!(t.take(&key), m.remove(&key));
                }
                Op::Query(key) => {
                    prop_assert_eq!(t.get(&key), m.get(&key));
                    let longest = m
                        .iter()
                        .filter(|(k, _)| key.starts_with(k.as_str()))
                        .max_by_key(|(k, _)| k.len())
                        .map(|(_, v)| v);
                    prop_assert_eq!(t.get_prefix_of(&key), longest);
                }
                Op::Compact => {
                    t.compact();
                    compacted = true;
                    prop_assert_eq!(t.node_count(), minimal_node_count(m.keys()));
                }
            }

            prop_assert_eq!(t.len(), m.len());
            validate_tree(&t.tree, |slot| usize::from(slot.is_some()), compacted);
        }

        let got: Vec<(String, u32)> = t.iter().map(|(k, v)| (k, *v)).collect();
        let expected: Vec<(String, u32)> = m.into_iter().collect();
        prop_assert_eq!(got, expected);
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

#[test]
fn exhaustive_remove_order_then_compact() {
    let keys = ["a", "b", "c", "aa", "ab", "ba"];

    let base: AsciiTrie = keys.iter().copied().collect();
    assert_eq!(base.node_count(), 7);

    for_each_permutation(&keys, |perm| {
        let mut t = base.clone();
        let mut remaining: BTreeSet<&str> = keys.iter().copied().collect();

        for k in perm {
            assert!(t.remove(k));
            remaining.remove(k);
            validate_tree(&t.tree, |&c| c, false);

            let mut c = t.clone();
            c.compact();
            let live: Vec<String> = remaining.iter().map(|k| k.to_string()).collect();
            assert_eq!(c.node_count(), minimal_node_count(&live));
            validate_tree(&c.tree, |&c| c, true);
        }
        assert!(t.is_empty());
        assert_eq!(t.node_count(), 7);
        t.compact();
        assert_eq!(t.node_count(), 1);
    });
}
