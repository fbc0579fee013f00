use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Input errors
    #[error("Input is empty")]
    EmptyInput,

    #[error("Input too large: {size} bytes exceeds 24-bit size field maximum {max}")]
    InputTooLarge { size: usize, max: usize },

    // RLE block errors
    #[error("RLE run length {0} out of range (3-130)")]
    RunLengthOutOfRange(usize),

    #[error("RLE literal block length {0} out of range (1-128)")]
    LiteralLengthOutOfRange(usize),

    // LZ77 block errors
    #[error("LZ77 displacement {0} out of range (0-4095)")]
    DisplacementOutOfRange(usize),

    #[error("LZ77 match length {0} out of range (3-18)")]
    MatchLengthOutOfRange(usize),

    // Huffman errors
    #[error("Symbol 0x{symbol:02x} does not fit in {bits} bits")]
    SymbolOutOfRange { symbol: u8, bits: u8 },

    #[error("Huffman tree too wide: node {node} needs child offset {offset} (max 63)")]
    TreeTooWide { node: usize, offset: isize },

    // Header errors
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    // Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
