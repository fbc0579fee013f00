pub mod encoder;
pub mod tree;

pub use encoder::{HuffmanEncoder, SymbolSize};
pub use tree::{Code, FrequencyCounter, HuffmanTree, Node};
