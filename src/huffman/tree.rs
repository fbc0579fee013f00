//! Huffman tree construction.
//!
//! Nodes live in an arena and refer to each other by index. Merging uses a
//! binary heap keyed by `(weight, insertion sequence)`, so among nodes of equal
//! weight the one queued first is merged first. Leaves are queued in order of
//! each symbol's first occurrence in the input. Both rules fix the tree shape,
//! and with it the exact output bytes.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::error::{Error, Result};

/// Symbol occurrence counts, remembering first-occurrence order
#[derive(Clone, Debug)]
pub struct FrequencyCounter {
    counts: [u64; 256],
    order: Vec<u8>,
}

impl FrequencyCounter {
    pub fn new() -> Self {
        Self { counts: [0; 256], order: Vec::new() }
    }

    /// Count every symbol in `symbols`
    pub fn count(&mut self, symbols: &[u8]) {
        for &symbol in symbols {
            if self.counts[symbol as usize] == 0 {
                self.order.push(symbol);
            }
            self.counts[symbol as usize] += 1;
        }
    }

    pub fn from_symbols(symbols: &[u8]) -> Self {
        let mut counter = Self::new();
        counter.count(symbols);
        counter
    }

    /// Occurrences of `symbol`
    pub fn get(&self, symbol: u8) -> u64 {
        self.counts[symbol as usize]
    }

    /// Distinct symbols with their counts, in first-occurrence order
    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.order.iter().map(|&symbol| (symbol, self.counts[symbol as usize]))
    }

    /// Number of distinct symbols seen
    pub fn distinct(&self) -> usize {
        self.order.len()
    }
}

impl Default for FrequencyCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// A node in the tree arena
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Node {
    Leaf { symbol: u8, weight: u64 },
    Inner { children: [usize; 2], weight: u64 },
}

impl Node {
    pub fn weight(&self) -> u64 {
        match *self {
            Node::Leaf { weight, .. } | Node::Inner { weight, .. } => weight,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }
}

/// Path from the root to a leaf, first step in the most significant used bit
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Code {
    pub bits: u64,
    pub len: u8,
}

impl Code {
    fn child(self, bit: u64) -> Self {
        Self { bits: (self.bits << 1) | bit, len: self.len + 1 }
    }

    /// True if `self` is a prefix of `other`
    pub fn is_prefix_of(&self, other: &Code) -> bool {
        self.len <= other.len && (other.bits >> (other.len - self.len)) == self.bits
    }
}

/// A Huffman tree with a code for every symbol it contains
#[derive(Clone, Debug)]
pub struct HuffmanTree {
    nodes: Vec<Node>,
    root: usize,
    codes: [Option<Code>; 256],
}

impl HuffmanTree {
    /// Build the tree for the counted symbols
    ///
    /// A single distinct symbol gets a root with that symbol on both sides,
    /// giving it the one-bit code `0` instead of an empty code.
    pub fn build(frequencies: &FrequencyCounter) -> Result<Self> {
        let mut nodes: Vec<Node> =
            frequencies.iter().map(|(symbol, weight)| Node::Leaf { symbol, weight }).collect();

        match nodes.len() {
            0 => return Err(Error::EmptyInput),
            1 => {
                let only = nodes[0];
                nodes.push(only);
                let root = nodes.len();
                nodes.push(Node::Inner { children: [0, 1], weight: only.weight() });
                return Ok(Self::with_codes(nodes, root));
            }
            _ => {}
        }

        let mut sequence = 0u64;
        let mut queue: BinaryHeap<Reverse<(u64, u64, usize)>> = BinaryHeap::new();
        for (index, node) in nodes.iter().enumerate() {
            queue.push(Reverse((node.weight(), sequence, index)));
            sequence += 1;
        }

        // Merge the two lightest nodes until one is left
        while let (Some(Reverse((w0, _, first))), Some(Reverse((w1, _, second)))) =
            (queue.pop(), queue.pop())
        {
            let index = nodes.len();
            nodes.push(Node::Inner { children: [first, second], weight: w0 + w1 });
            queue.push(Reverse((w0 + w1, sequence, index)));
            sequence += 1;
        }

        // The loop stops after popping the root alone
        let root = nodes.len() - 1;
        Ok(Self::with_codes(nodes, root))
    }

    fn with_codes(nodes: Vec<Node>, root: usize) -> Self {
        let mut codes = [None; 256];
        let mut stack = vec![(root, Code::default())];

        while let Some((index, code)) = stack.pop() {
            match nodes[index] {
                Node::Leaf { symbol, .. } => {
                    // A duplicated leaf keeps the first path found
                    codes[symbol as usize].get_or_insert(code);
                }
                Node::Inner { children, .. } => {
                    stack.push((children[1], code.child(1)));
                    stack.push((children[0], code.child(0)));
                }
            }
        }

        Self { nodes, root, codes }
    }

    pub fn root(&self) -> usize {
        self.root
    }

    pub fn node(&self, index: usize) -> &Node {
        &self.nodes[index]
    }

    /// Number of leaf nodes in the tree
    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Code assigned to `symbol`, if it occurs in the input
    pub fn code(&self, symbol: u8) -> Option<Code> {
        self.codes[symbol as usize]
    }

    /// All symbols with their codes, in symbol order
    pub fn codes(&self) -> impl Iterator<Item = (u8, Code)> + '_ {
        self.codes.iter().enumerate().filter_map(|(s, c)| c.map(|c| (s as u8, c)))
    }

    /// Node indices in breadth-first order, starting at the root
    ///
    /// Both children of an inner node are queued together, so they always
    /// sit next to each other in the result.
    pub fn breadth_first(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.nodes.len());
        order.push(self.root);

        let mut next = 0;
        while next < order.len() {
            if let Node::Inner { children, .. } = self.nodes[order[next]] {
                order.extend_from_slice(&children);
            }
            next += 1;
        }
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_for(symbols: &[u8]) -> HuffmanTree {
        HuffmanTree::build(&FrequencyCounter::from_symbols(symbols)).unwrap()
    }

    #[test]
    fn test_frequency_first_occurrence_order() {
        let freq = FrequencyCounter::from_symbols(b"banana");
        let counts: Vec<(u8, u64)> = freq.iter().collect();
        assert_eq!(counts, vec![(b'b', 1), (b'a', 3), (b'n', 2)]);
        assert_eq!(freq.distinct(), 3);
        assert_eq!(freq.get(b'z'), 0);
    }

    #[test]
    fn test_banana_codes() {
        // b(1) and n(2) merge first, then a(3) against the pair(3): a was queued first
        let tree = tree_for(b"banana");
        assert_eq!(tree.code(b'a'), Some(Code { bits: 0b0, len: 1 }));
        assert_eq!(tree.code(b'b'), Some(Code { bits: 0b10, len: 2 }));
        assert_eq!(tree.code(b'n'), Some(Code { bits: 0b11, len: 2 }));
        assert_eq!(tree.code(b'x'), None);
        assert_eq!(tree.leaf_count(), 3);
    }

    #[test]
    fn test_equal_weights_merge_in_queue_order() {
        // All weight 1: (a,b) then (c,d), then the two pairs in creation order
        let tree = tree_for(b"abcd");
        assert_eq!(tree.code(b'a'), Some(Code { bits: 0b00, len: 2 }));
        assert_eq!(tree.code(b'b'), Some(Code { bits: 0b01, len: 2 }));
        assert_eq!(tree.code(b'c'), Some(Code { bits: 0b10, len: 2 }));
        assert_eq!(tree.code(b'd'), Some(Code { bits: 0b11, len: 2 }));
    }

    #[test]
    fn test_merged_node_queued_after_equal_weights() {
        // a=1,b=1 merge to (ab)=2, which queues behind c=2 and d=2,
        // so c pairs with d rather than with (ab)
        let tree = tree_for(b"abccdd");
        let Node::Inner { children, .. } = *tree.node(tree.root()) else {
            panic!("root must be inner")
        };
        assert_eq!(tree.node(children[0]).weight(), 2);
        assert_eq!(tree.node(children[1]).weight(), 4);
        assert_eq!(tree.code(b'a'), Some(Code { bits: 0b00, len: 2 }));
        assert_eq!(tree.code(b'b'), Some(Code { bits: 0b01, len: 2 }));
        assert_eq!(tree.code(b'c'), Some(Code { bits: 0b10, len: 2 }));
        assert_eq!(tree.code(b'd'), Some(Code { bits: 0b11, len: 2 }));
    }

    #[test]
    fn test_single_symbol_gets_one_bit() {
        let tree = tree_for(&[0x41; 4]);
        assert_eq!(tree.code(0x41), Some(Code { bits: 0, len: 1 }));
        assert_eq!(tree.leaf_count(), 2);
        assert_eq!(tree.breadth_first().len(), 3);
    }

    #[test]
    fn test_empty_rejected() {
        let result = HuffmanTree::build(&FrequencyCounter::new());
        assert!(matches!(result, Err(Error::EmptyInput)));
    }

    #[test]
    fn test_prefix_free() {
        let symbols: Vec<u8> = (0..2000u32).map(|i| ((i * i + 3 * i) % 97) as u8).collect();
        let tree = tree_for(&symbols);
        let codes: Vec<Code> = tree.codes().map(|(_, c)| c).collect();
        for (i, a) in codes.iter().enumerate() {
            for (j, b) in codes.iter().enumerate() {
                if i != j {
                    assert!(!a.is_prefix_of(b), "{a:?} is a prefix of {b:?}");
                }
            }
        }
    }

    #[test]
    fn test_breadth_first_children_adjacent() {
        let tree = tree_for(b"the quick brown fox jumps over the lazy dog");
        let order = tree.breadth_first();
        let mut position = vec![0; order.len()];
        for (pos, &index) in order.iter().enumerate() {
            position[index] = pos;
        }
        for &index in &order {
            if let Node::Inner { children, .. } = tree.node(index) {
                assert_eq!(position[children[0]] + 1, position[children[1]]);
                assert!(position[children[0]] > position[index]);
            }
        }
    }
}
