//! Static Huffman code construction, used to estimate encoded sizes
//!
//! Only the code lengths matter for size estimation, but the code words are available as well.
use crate::util::frequencies;
use std::{
    cmp::{Ordering, Reverse},
    collections::{BTreeMap, BinaryHeap},
};

/// A code tree. Leaves are symbols, a left edge is a `0`, a right edge a `1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeTree {
    Leaf(char),
    Branch(Box<CodeTree>, Box<CodeTree>),
}

/// heap entry, ordered by weight and then by the order in which entries were created
#[derive(Debug)]
struct Weighted {
    weight: u64,
    seq: usize,
    tree: CodeTree,
}

impl PartialEq for Weighted {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Weighted {}

impl PartialOrd for Weighted {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Weighted {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.weight, self.seq).cmp(&(other.weight, other.seq))
    }
}

impl CodeTree {
    /// Builds a minimum weight code tree for the given symbol counts.
    ///
    /// Returns None for an empty table. A single symbol gives a lone leaf, i.e. a code of length 0.
    pub fn build(counts: &BTreeMap<char, u32>) -> Option<Self> {
        let mut heap = BinaryHeap::with_capacity(counts.len());
        let mut seq = 0;
        for (symbol, count) in counts {
            heap.push(Reverse(Weighted {
                weight: u64::from(*count),
                seq,
                tree: CodeTree::Leaf(*symbol),
            }));
            seq += 1;
        }
        while heap.len() > 1 {
            if let (Some(Reverse(left)), Some(Reverse(right))) = (heap.pop(), heap.pop()) {
                heap.push(Reverse(Weighted {
                    weight: left.weight + right.weight,
                    seq,
                    tree: CodeTree::Branch(Box::new(left.tree), Box::new(right.tree)),
                }));
                seq += 1;
            }
        }
        heap.pop().map(|Reverse(root)| root.tree)
    }

    /// depth of each leaf
    pub fn code_lengths(&self) -> BTreeMap<char, u32> {
        let mut res = BTreeMap::new();
        self.visit(&mut Vec::new(), &mut |symbol, path| {
            res.insert(symbol, path.len() as u32);
        });
        res
    }

    /// code word of each leaf, as a string of `0` and `1`
    pub fn codes(&self) -> BTreeMap<char, String> {
        let mut res = BTreeMap::new();
        self.visit(&mut Vec::new(), &mut |symbol, path| {
            let code = path.iter().map(|bit| if *bit { '1' } else { '0' }).collect();
            res.insert(symbol, code);
        });
        res
    }

    fn visit(&self, path: &mut Vec<bool>, f: &mut impl FnMut(char, &[bool])) {
        match self {
            CodeTree::Leaf(symbol) => f(*symbol, path),
            CodeTree::Branch(left, right) => {
                path.push(false);
                left.visit(path, f);
                path.pop();
                path.push(true);
                right.visit(path, f);
                path.pop();
            }
        }
    }
}

/// Huffman code length of each symbol of `text`
pub fn code_lengths(text: &str) -> BTreeMap<char, u32> {
    CodeTree::build(&frequencies(text))
        .map(|tree| tree.code_lengths())
        .unwrap_or_default()
}

/// Huffman code word of each symbol of `text`
pub fn codes(text: &str) -> BTreeMap<char, String> {
    CodeTree::build(&frequencies(text))
        .map(|tree| tree.codes())
        .unwrap_or_default()
}

/// Number of bits needed to Huffman encode `text` with a code built from `text` itself
pub fn encoded_bits(text: &str) -> u64 {
    let counts = frequencies(text);
    let lengths = CodeTree::build(&counts)
        .map(|tree| tree.code_lengths())
        .unwrap_or_default();
    counts
        .iter()
        .map(|(symbol, count)| {
            let length = lengths.get(symbol).copied().unwrap_or_default();
            u64::from(*count) * u64::from(length)
        })
        .sum()
}
