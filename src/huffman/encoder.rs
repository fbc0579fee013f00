use tracing::{debug, trace};

use super::tree::{FrequencyCounter, HuffmanTree, Node};
use crate::bits::BitWriter;
use crate::error::{Error, Result};
use crate::header::{FormatHeader, FormatType};
use crate::{check_input, CompressStats, Encoder};

/// Largest child offset the 6-bit node field can hold
const MAX_NODE_OFFSET: isize = 0x3F;

/// Node flag: first child is a leaf
const CHILD0_LEAF: u8 = 0x80;

/// Node flag: second child is a leaf
const CHILD1_LEAF: u8 = 0x40;

/// Width of the symbols the tree is built over
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum SymbolSize {
    /// Each byte is two symbols, low nibble first
    Four = 4,
    #[default]
    Eight = 8,
}

impl SymbolSize {
    pub fn bits(&self) -> u8 {
        *self as u8
    }

    /// Split input bytes into symbols of this width
    pub fn symbols(&self, input: &[u8]) -> Vec<u8> {
        match self {
            SymbolSize::Eight => input.to_vec(),
            SymbolSize::Four => input.iter().flat_map(|&b| [b & 0x0F, b >> 4]).collect(),
        }
    }
}

/// Huffman encoder producing the BIOS tree table and 32-bit bitstream
#[derive(Clone, Debug, Default)]
pub struct HuffmanEncoder {
    symbol_size: SymbolSize,
}

impl HuffmanEncoder {
    pub fn new(symbol_size: SymbolSize) -> Self {
        Self { symbol_size }
    }

    pub fn symbol_size(&self) -> SymbolSize {
        self.symbol_size
    }

    /// Build the tree for `input`, returning it with the symbol sequence to encode
    pub fn compress(&self, input: &[u8]) -> Result<(HuffmanTree, Vec<u8>)> {
        let symbols = self.symbol_size.symbols(input);
        let tree = HuffmanTree::build(&FrequencyCounter::from_symbols(&symbols))?;
        Ok((tree, symbols))
    }

    /// Write header, tree table, alignment padding and the packed bitstream
    ///
    /// ```text
    /// Tree size (8bit)   Offset to bitstream / 2 - 1
    /// Tree table         Breadth-first nodes, root first
    ///   Inner node       Bit 0-5 child offset, Bit 6 child1 is leaf, Bit 7 child0 is leaf
    ///   Leaf node        Symbol value
    /// Bitstream          32-bit words, bit 31 first
    /// ```
    pub fn serialize(
        &self,
        tree: &HuffmanTree,
        symbols: &[u8],
        decompressed_size: usize,
    ) -> Result<Vec<u8>> {
        // Size is in decompressed bytes for both widths, not the legacy nibble count
        let header =
            FormatHeader::new(FormatType::Huffman, self.symbol_size.bits(), decompressed_size)?;
        let table = self.tree_table(tree)?;

        // Header plus size byte plus table must end on a word boundary
        let padding = if (table.len() + 1) % 4 == 2 { 2 } else { 0 };
        // Counts the padding, so an odd leaf count writes leafCount rather than
        // the legacy leafCount - 1; (tree_size + 1) * 2 then reaches the bitstream
        let tree_size = (table.len() + 1 + padding) / 2 - 1;
        debug_assert!(tree_size <= u8::MAX as usize);
        trace!(nodes = table.len(), padding, tree_size, "Huffman tree table");

        let mut writer = BitWriter::with_capacity(4 + 1 + table.len() + padding + symbols.len());
        header.write(&mut writer);
        writer.write_byte(tree_size as u8);
        writer.write_bytes(&table);
        if padding > 0 {
            writer.write_u16_le(0);
        }

        for &symbol in symbols {
            let code = tree.code(symbol).ok_or_else(|| {
                Error::Internal(format!("symbol 0x{symbol:02x} missing from Huffman tree"))
            })?;
            writer.write_bits(code.bits, code.len);
        }

        Ok(writer.finish())
    }

    /// Flatten the tree into its breadth-first node bytes
    fn tree_table(&self, tree: &HuffmanTree) -> Result<Vec<u8>> {
        let order = tree.breadth_first();

        let mut position = vec![0usize; order.len()];
        for (pos, &index) in order.iter().enumerate() {
            position[index] = pos;
        }

        let mut table = Vec::with_capacity(order.len());
        for (i, &index) in order.iter().enumerate() {
            let byte = match *tree.node(index) {
                Node::Leaf { symbol, .. } => {
                    if u32::from(symbol) >> self.symbol_size.bits() != 0 {
                        return Err(Error::SymbolOutOfRange {
                            symbol,
                            bits: self.symbol_size.bits(),
                        });
                    }
                    symbol
                }
                Node::Inner { children, .. } => {
                    // Children sit at ((i + 1) & !1) + offset * 2 + 1 and + 2
                    let second = position[children[1]] as isize;
                    let distance = second - ((i as isize + 1) & !1) - 2;
                    let offset = distance / 2;
                    if distance % 2 != 0 || !(0..=MAX_NODE_OFFSET).contains(&offset) {
                        return Err(Error::TreeTooWide { node: i, offset });
                    }

                    let mut byte = offset as u8;
                    if tree.node(children[0]).is_leaf() {
                        byte |= CHILD0_LEAF;
                    }
                    if tree.node(children[1]).is_leaf() {
                        byte |= CHILD1_LEAF;
                    }
                    byte
                }
            };
            table.push(byte);
        }

        Ok(table)
    }
}

impl Encoder for HuffmanEncoder {
    fn encode_with_stats(&self, input: &[u8]) -> Result<(Vec<u8>, CompressStats)> {
        check_input(input)?;

        let (tree, symbols) = self.compress(input)?;
        let output = self.serialize(&tree, &symbols, input.len())?;

        debug!(
            symbol_bits = self.symbol_size.bits(),
            leaves = tree.leaf_count(),
            input_bytes = input.len(),
            output_bytes = output.len(),
            "Huffman encode complete"
        );

        let stats = CompressStats {
            input_bytes: input.len() as u64,
            output_bytes: output.len() as u64,
            leaves: tree.leaf_count() as u64,
            ..Default::default()
        };
        Ok((output, stats))
    }
}
