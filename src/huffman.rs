/// Huffman coding: tree construction and code assignment.
///
/// The tree is built greedily from a [`FrequencyTable`] by repeatedly
/// merging the two lightest nodes. Ties are broken by creation order
/// (leaves in ascending byte order, then merged nodes as they appear),
/// so the same input always yields the same codes.
///
/// The tree only lives long enough to be walked once:
/// [`HuffmanTree::code_table`] consumes it and returns a [`CodeTable`].
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use tracing::trace;

use crate::frequency::{self, FrequencyTable};
use crate::pqueue::MinHeap;
use crate::{PackError, PackResult};

/// Longest code a tree over 256 leaves can produce.
pub const MAX_CODE_LEN: usize = 255;

/// A node in the Huffman tree. Internal nodes own their children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuffmanNode {
    Leaf {
        symbol: u8,
        freq: u64,
    },
    Internal {
        freq: u64,
        left: Box<HuffmanNode>,
        right: Box<HuffmanNode>,
    },
}

impl HuffmanNode {
    /// Frequency weight of this node (or subtree).
    pub fn freq(&self) -> u64 {
        match self {
            HuffmanNode::Leaf { freq, .. } | HuffmanNode::Internal { freq, .. } => *freq,
        }
    }

    /// Combine two subtrees; `left` takes the 0 branch.
    fn merge(left: HuffmanNode, right: HuffmanNode) -> HuffmanNode {
        HuffmanNode::Internal {
            freq: left.freq() + right.freq(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

/// A Huffman tree for a single encode call.
#[derive(Debug, Clone)]
pub struct HuffmanTree {
    root: HuffmanNode,
    /// Number of distinct symbols in the tree.
    pub leaf_count: u32,
}

impl HuffmanTree {
    /// Build a Huffman tree from input data.
    pub fn from_data(input: &[u8]) -> PackResult<Self> {
        Self::build(&frequency::get_frequency(input))
    }

    /// Build a Huffman tree from a pre-computed frequency table.
    ///
    /// Nodes are keyed by `(freq, seq)` where `seq` is the creation
    /// order. The first node popped becomes the left child.
    pub fn build(freq: &FrequencyTable) -> PackResult<Self> {
        if freq.is_empty() {
            return Err(PackError::EmptyFrequencyTable);
        }

        let mut heap: MinHeap<(u64, u64), HuffmanNode> =
            MinHeap::with_capacity(freq.used as usize);
        let mut seq = 0u64;
        for (symbol, count) in freq.symbols() {
            heap.push((count, seq), HuffmanNode::Leaf { symbol, freq: count });
            seq += 1;
        }

        while let Some((_, left)) = heap.pop() {
            let Some((_, right)) = heap.pop() else {
                // Last unparented node is the root.
                return Ok(HuffmanTree {
                    root: left,
                    leaf_count: freq.used,
                });
            };
            let parent = HuffmanNode::merge(left, right);
            trace!(seq, freq = parent.freq(), "merged nodes");
            heap.push((parent.freq(), seq), parent);
            seq += 1;
        }

        Err(PackError::EmptyFrequencyTable)
    }

    /// The root node. A single-symbol tree's root is a leaf.
    pub fn root(&self) -> &HuffmanNode {
        &self.root
    }

    /// Walk the tree and assign a code to every leaf.
    ///
    /// Left edges are 0, right edges are 1. A root that is itself a leaf
    /// gets the one-bit code `0`.
    pub fn code_table(self) -> CodeTable {
        let mut table = CodeTable::new();
        match self.root {
            HuffmanNode::Leaf { symbol, .. } => {
                let mut code = Code::new();
                code.push(false);
                table.insert(symbol, code);
            }
            root => {
                let mut path = Code::new();
                Self::assign_codes(root, &mut path, &mut table);
            }
        }
        table
    }

    fn assign_codes(node: HuffmanNode, path: &mut Code, table: &mut CodeTable) {
        match node {
            HuffmanNode::Leaf { symbol, .. } => {
                table.insert(symbol, path.clone());
            }
            HuffmanNode::Internal { left, right, .. } => {
                path.push(false);
                Self::assign_codes(*left, path, table);
                path.pop();
                path.push(true);
                Self::assign_codes(*right, path, table);
                path.pop();
            }
        }
    }
}

/// A Huffman code: a non-empty sequence of bits, first bit first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Code {
    bits: Vec<bool>,
}

impl Code {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bit: bool) {
        self.bits.push(bit);
    }

    pub fn pop(&mut self) -> Option<bool> {
        self.bits.pop()
    }

    pub fn clear(&mut self) {
        self.bits.clear();
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// True if `self` is a (non-strict) prefix of `other`.
    pub fn is_prefix_of(&self, other: &Code) -> bool {
        other.bits.starts_with(&self.bits)
    }
}

impl From<&[bool]> for Code {
    fn from(bits: &[bool]) -> Self {
        Code {
            bits: bits.to_vec(),
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in &self.bits {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Symbol → code mapping, iterated in ascending symbol order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeTable {
    codes: BTreeMap<u8, Code>,
}

impl CodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: u8, code: Code) {
        self.codes.insert(symbol, code);
    }

    pub fn get(&self, symbol: u8) -> Option<&Code> {
        self.codes.get(&symbol)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &Code)> + '_ {
        self.codes.iter().map(|(&s, c)| (s, c))
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Check that no code is a prefix of another.
    ///
    /// In lexicographic order a code that prefixes any other code also
    /// prefixes its immediate successor, so adjacent pairs suffice.
    pub fn is_prefix_free(&self) -> bool {
        let mut codes: Vec<&Code> = self.codes.values().collect();
        codes.sort();
        codes.windows(2).all(|w| !w[0].is_prefix_of(w[1]))
    }

    /// Total payload bits needed to encode data with these frequencies.
    pub fn encoded_bits(&self, freq: &FrequencyTable) -> u64 {
        self.iter()
            .map(|(symbol, code)| freq.get(symbol) * code.len() as u64)
            .sum()
    }

    /// Invert the table for decoding.
    pub fn reverse(&self) -> ReverseCodeTable {
        let mut lookup = HashMap::with_capacity(self.codes.len());
        let mut max_len = 0;
        for (symbol, code) in self.iter() {
            max_len = max_len.max(code.len());
            lookup.insert(code.clone(), symbol);
        }
        ReverseCodeTable { lookup, max_len }
    }
}

/// Code → symbol mapping used while decoding.
#[derive(Debug, Clone, Default)]
pub struct ReverseCodeTable {
    lookup: HashMap<Code, u8>,
    max_len: usize,
}

impl ReverseCodeTable {
    /// The symbol whose code is exactly `code`, if any.
    pub fn lookup(&self, code: &Code) -> Option<u8> {
        self.lookup.get(code).copied()
    }

    /// Length of the longest code. An accumulator this long that has not
    /// matched never will.
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }
}
