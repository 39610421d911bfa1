//! A multiway search tree with preemptive top-down rebalancing
//!
//! Nodes own their children directly. Inserts split full children *before* descending into them,
//! and removes refill underfull children *before* descending into them, so no operation ever has
//! to walk back up the tree.
//!
//! # Split policy
//!
//! A full node (`MAX_KEYS` keys) is split by promoting the key at local index 1. The left half keeps
//! one key, the new right sibling gets the keys from index 2 on. Nodes produced by a split can
//! therefore hold a single key, and the removal algorithm is written to cope with that: a child is
//! only refilled when it holds fewer than `MIN_KEYS` keys, and a sibling only lends a key when it
//! holds at least `MIN_KEYS`.
use crate::util::is_strictly_sorted;
use core::fmt;
use smallvec::SmallVec;
use std::borrow::Borrow;
use tracing::*;

/// maximum number of keys in a node
pub const MAX_KEYS: usize = 4;
/// a child with fewer keys than this is refilled before a remove descends into it
pub const MIN_KEYS: usize = 2;
/// local index of the key that moves up into the parent when a full node is split
const SPLIT_INDEX: usize = 1;

type Keys<K> = SmallVec<[K; MAX_KEYS]>;

/// A tree node. A node without children is a leaf, otherwise it has exactly one more child than keys.
#[derive(Clone, PartialEq, Eq)]
pub struct Node<K> {
    keys: Keys<K>,
    children: Vec<Node<K>>,
}

impl<K> Node<K> {
    fn leaf(key: K) -> Self {
        let mut keys = Keys::new();
        keys.push(key);
        Self {
            keys,
            children: Vec::new(),
        }
    }

    fn empty() -> Self {
        Self {
            keys: Keys::new(),
            children: Vec::new(),
        }
    }

    fn branch(child: Node<K>) -> Self {
        Self {
            keys: Keys::new(),
            children: vec![child],
        }
    }

    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    pub fn children(&self) -> &[Node<K>] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    fn is_full(&self) -> bool {
        self.keys.len() == MAX_KEYS
    }

    /// position of the first key that is not smaller than `key`, or the number of keys
    fn find_key<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.keys.partition_point(|k| Borrow::<Q>::borrow(k) < key)
    }

    fn matches<Q>(&self, idx: usize, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.keys
            .get(idx)
            .map(|k| Borrow::<Q>::borrow(k) == key)
            .unwrap_or_default()
    }

    fn count(&self) -> usize {
        self.keys.len() + self.children.iter().map(Node::count).sum::<usize>()
    }

    fn collect_keys<'a>(&'a self, res: &mut Vec<&'a K>) {
        if self.is_leaf() {
            res.extend(self.keys.iter());
        } else {
            for (i, child) in self.children.iter().enumerate() {
                child.collect_keys(res);
                if let Some(key) = self.keys.get(i) {
                    res.push(key);
                }
            }
        }
    }
}

impl<K: Ord> Node<K> {
    fn insert_non_full(&mut self, key: K) {
        // number of keys not greater than the new one
        let mut i = self.keys.partition_point(|k| *k <= key);
        if self.is_leaf() {
            self.keys.insert(i, key);
            return;
        }
        if self.children[i].is_full() {
            self.split_child(i);
            if self.keys[i] < key {
                i += 1;
            }
        }
        self.children[i].insert_non_full(key);
    }

    /// Splits the full child at `i`, promoting its key at [SPLIT_INDEX] into this node
    fn split_child(&mut self, i: usize) {
        let child = &mut self.children[i];
        let sibling = Node {
            keys: child.keys.drain(SPLIT_INDEX + 1..).collect(),
            children: if child.is_leaf() {
                Vec::new()
            } else {
                child.children.split_off(SPLIT_INDEX + 1)
            },
        };
        let promoted = child.keys.remove(SPLIT_INDEX);
        trace!("splitting child {} ({} keys moved right)", i, sibling.keys.len());
        self.children.insert(i + 1, sibling);
        self.keys.insert(i, promoted);
    }
}

impl<K: Ord + Clone> Node<K> {
    fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let idx = self.find_key(key);
        if self.matches(idx, key) {
            if self.is_leaf() {
                self.keys.remove(idx);
            } else {
                self.remove_from_branch(idx, key);
            }
            return true;
        }
        if self.is_leaf() {
            return false;
        }
        let last = idx == self.keys.len();
        if self.children[idx].keys.len() < MIN_KEYS {
            self.fill(idx);
        }
        // a merge with the left sibling shifts the last child one position to the left
        if last && idx > self.keys.len() {
            self.children[idx - 1].remove(key)
        } else {
            self.children[idx].remove(key)
        }
    }

    fn remove_from_branch<Q>(&mut self, idx: usize, key: &Q)
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        if self.children[idx].keys.len() >= MIN_KEYS {
            let pred = self.predecessor(idx).clone();
            self.children[idx].remove::<K>(&pred);
            self.keys[idx] = pred;
        } else if self.children[idx + 1].keys.len() >= MIN_KEYS {
            let succ = self.successor(idx).clone();
            self.children[idx + 1].remove::<K>(&succ);
            self.keys[idx] = succ;
        } else {
            self.merge(idx);
            self.children[idx].remove(key);
        }
    }

    /// Makes sure the child at `idx` can lose a key
    fn fill(&mut self, idx: usize) {
        if idx != 0 && self.children[idx - 1].keys.len() >= MIN_KEYS {
            self.borrow_from_prev(idx);
        } else if idx != self.keys.len() && self.children[idx + 1].keys.len() >= MIN_KEYS {
            self.borrow_from_next(idx);
        } else if idx != self.keys.len() {
            self.merge(idx);
        } else {
            self.merge(idx - 1);
        }
    }

    fn borrow_from_prev(&mut self, idx: usize) {
        trace!("child {} borrows from its left sibling", idx);
        let (left, right) = self.children.split_at_mut(idx);
        let sibling = &mut left[idx - 1];
        let child = &mut right[0];
        if let Some(last) = sibling.keys.pop() {
            let separator = std::mem::replace(&mut self.keys[idx - 1], last);
            child.keys.insert(0, separator);
            if let Some(grandchild) = sibling.children.pop() {
                child.children.insert(0, grandchild);
            }
        }
    }

    fn borrow_from_next(&mut self, idx: usize) {
        trace!("child {} borrows from its right sibling", idx);
        let (left, right) = self.children.split_at_mut(idx + 1);
        let child = &mut left[idx];
        let sibling = &mut right[0];
        if !sibling.keys.is_empty() {
            let first = sibling.keys.remove(0);
            let separator = std::mem::replace(&mut self.keys[idx], first);
            child.keys.push(separator);
            if !sibling.children.is_empty() {
                child.children.push(sibling.children.remove(0));
            }
        }
    }

    /// Folds the child at `idx + 1` and the separator between them into the child at `idx`
    fn merge(&mut self, idx: usize) {
        trace!("merging children {} and {}", idx, idx + 1);
        let sibling = self.children.remove(idx + 1);
        let separator = self.keys.remove(idx);
        let child = &mut self.children[idx];
        child.keys.push(separator);
        child.keys.extend(sibling.keys);
        child.children.extend(sibling.children);
    }

    /// rightmost key of the subtree left of the key at `idx`
    fn predecessor(&self, idx: usize) -> &K {
        let mut current = &self.children[idx];
        while !current.is_leaf() {
            current = &current.children[current.keys.len()];
        }
        &current.keys[current.keys.len() - 1]
    }

    /// leftmost key of the subtree right of the key at `idx`
    fn successor(&self, idx: usize) -> &K {
        let mut current = &self.children[idx + 1];
        while !current.is_leaf() {
            current = &current.children[0];
        }
        &current.keys[0]
    }
}

impl<K: fmt::Debug> fmt::Debug for Node<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_leaf() {
            f.debug_list().entries(self.keys.iter()).finish()
        } else {
            f.debug_struct("Node")
                .field("keys", &self.keys)
                .field("children", &self.children)
                .finish()
        }
    }
}

/// A multiway search tree of unique keys
#[derive(Clone, PartialEq, Eq)]
pub struct Tree<K>(Option<Node<K>>);

impl<K> Tree<K> {
    pub fn new() -> Self {
        Self(None)
    }

    /// true for an empty tree
    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// root of a non-empty tree
    pub fn root(&self) -> Option<&Node<K>> {
        self.0.as_ref()
    }

    /// number of keys in the tree. This walks the entire tree.
    pub fn count(&self) -> usize {
        self.0.as_ref().map(Node::count).unwrap_or_default()
    }

    /// number of levels, 0 for the empty tree
    pub fn height(&self) -> usize {
        let mut res = 0;
        let mut current = self.0.as_ref();
        while let Some(node) = current {
            res += 1;
            current = node.children.first();
        }
        res
    }

    /// all keys, in order
    pub fn keys(&self) -> Vec<&K> {
        let mut res = Vec::new();
        if let Some(root) = &self.0 {
            root.collect_keys(&mut res);
        }
        res
    }

    /// Top-down lookup of a key
    pub fn get<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self.0.as_ref()?;
        loop {
            let idx = current.find_key(key);
            if current.matches(idx, key) {
                return Some(&current.keys[idx]);
            }
            current = current.children.get(idx)?;
        }
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get(key).is_some()
    }
}

impl<K: Ord> Tree<K> {
    /// Inserts a key that is not yet in the tree.
    ///
    /// Uniqueness is the caller's concern, inserting a key twice stores it twice.
    pub fn insert(&mut self, key: K) {
        let root = match &mut self.0 {
            Some(root) => root,
            None => {
                self.0 = Some(Node::leaf(key));
                return;
            }
        };
        if root.is_full() {
            let old = std::mem::replace(root, Node::empty());
            let mut new_root = Node::branch(old);
            new_root.split_child(0);
            debug!("root split, height grows");
            *root = new_root;
        }
        root.insert_non_full(key);
    }
}

impl<K: Ord + Clone> Tree<K> {
    /// Removes a key, returns whether it was present
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let root = match &mut self.0 {
            Some(root) => root,
            None => return false,
        };
        let removed = root.remove(key);
        if root.keys.is_empty() {
            let demoted = if root.is_leaf() {
                None
            } else {
                debug!("root emptied, height shrinks");
                Some(root.children.remove(0))
            };
            self.0 = demoted;
        }
        removed
    }
}

impl<K: Ord + fmt::Debug> Tree<K> {
    /// Checks the structural invariants, returning a description of each violation
    pub fn check_invariants(&self) -> Vec<String> {
        let mut msgs = Vec::new();
        if let Some(root) = &self.0 {
            let mut leaf_depth = None;
            check_node(root, 0, &mut leaf_depth, &mut msgs);
            if !is_strictly_sorted(self.keys().into_iter()) {
                msgs.push(format!("keys out of order: {:?}", self.keys()));
            }
        }
        msgs
    }
}

fn check_node<K: Ord + fmt::Debug>(
    node: &Node<K>,
    depth: usize,
    leaf_depth: &mut Option<usize>,
    msgs: &mut Vec<String>,
) {
    macro_rules! check {
        ($expression:expr) => {
            if !$expression {
                let text = stringify!($expression);
                msgs.push(format!("{} at depth {} for {:?}", text, depth, node.keys));
            }
        };
    }
    check!(node.keys.len() <= MAX_KEYS);
    check!(!node.keys.is_empty());
    check!(is_strictly_sorted(node.keys.iter()));
    if node.is_leaf() {
        match leaf_depth {
            Some(expected) => check!(*expected == depth),
            None => *leaf_depth = Some(depth),
        }
    } else {
        check!(node.children.len() == node.keys.len() + 1);
        for child in &node.children {
            check_node(child, depth + 1, leaf_depth, msgs);
        }
    }
}

impl<K> Default for Tree<K> {
    fn default() -> Self {
        Self(None)
    }
}

impl<K: fmt::Debug> fmt::Debug for Tree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(root) => f.debug_tuple("Tree").field(root).finish(),
            None => write!(f, "empty tree"),
        }
    }
}
