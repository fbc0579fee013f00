//! Byte-exact encoders for the BIOS decompression formats.
//!
//! Three formats are supported, each behind the same 4-byte header:
//! - run-length encoding (type 3)
//! - LZ77 with a 4096-byte window (type 1)
//! - Huffman with 4-bit or 8-bit symbols (type 2)
//!
//! Input is held in memory and encoded in one pass. Callers pad input to a
//! multiple of four bytes (see [`pad_to_word`]) before encoding.

pub mod bits;
pub mod error;
pub mod header;
pub mod huffman;
pub mod lz77;
pub mod rle;

pub use error::{Error, Result};
pub use header::{FormatHeader, FormatType, MAX_DECOMPRESSED_SIZE};
pub use huffman::{HuffmanEncoder, SymbolSize};
pub use lz77::{Lz77Encoder, Lz77Token};
pub use rle::{RleBlock, RleEncoder};

use std::io::Write;

/// Compression format selected by the caller
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Rle,
    Lz77,
    /// Huffman over whole bytes
    Huffman8,
    /// Huffman over nibbles, low nibble first
    Huffman4,
}

impl Mode {
    /// Compression type stored in the header
    pub fn format_type(&self) -> FormatType {
        match self {
            Self::Rle => FormatType::Rle,
            Self::Lz77 => FormatType::Lz77,
            Self::Huffman8 | Self::Huffman4 => FormatType::Huffman,
        }
    }

    /// Symbol width for Huffman modes
    pub fn symbol_size(&self) -> Option<SymbolSize> {
        match self {
            Self::Huffman8 => Some(SymbolSize::Eight),
            Self::Huffman4 => Some(SymbolSize::Four),
            Self::Rle | Self::Lz77 => None,
        }
    }

    /// Create the encoder for this mode
    pub fn encoder(&self, config: &CompressConfig) -> Box<dyn Encoder> {
        match self {
            Self::Rle => Box::new(RleEncoder::new()),
            Self::Lz77 => Box::new(Lz77Encoder::from_config(config)),
            Self::Huffman8 => Box::new(HuffmanEncoder::new(SymbolSize::Eight)),
            Self::Huffman4 => Box::new(HuffmanEncoder::new(SymbolSize::Four)),
        }
    }
}

/// Configuration for encoding
#[derive(Clone, Debug)]
pub struct CompressConfig {
    /// Never emit LZ77 displacement 0, for decoders writing 16 bits at a time
    pub vram_safe: bool,
    /// Threads for the LZ77 match search (0 = auto, 1 = single-threaded)
    pub num_threads: usize,
}

impl Default for CompressConfig {
    fn default() -> Self {
        Self { vram_safe: false, num_threads: 1 }
    }
}

/// Statistics from an encode
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompressStats {
    pub input_bytes: u64,
    pub output_bytes: u64,
    /// RLE blocks or LZ77 tokens
    pub blocks: u64,
    /// LZ77 back-references among `blocks`
    pub back_references: u64,
    /// Huffman tree leaves
    pub leaves: u64,
}

/// Trait for a complete single-format encode
pub trait Encoder {
    /// Encode `input`, returning the full stream (header included) and statistics
    fn encode_with_stats(&self, input: &[u8]) -> Result<(Vec<u8>, CompressStats)>;

    /// Encode `input`, returning the full stream
    fn encode(&self, input: &[u8]) -> Result<Vec<u8>> {
        self.encode_with_stats(input).map(|(output, _)| output)
    }
}

/// Encode `input` in the given mode
///
/// The result is either the complete stream or an error; nothing partial is
/// returned.
pub fn encode(mode: Mode, config: &CompressConfig, input: &[u8]) -> Result<Vec<u8>> {
    mode.encoder(config).encode(input)
}

/// Encode `input` and write the finished stream to `output`
///
/// Nothing is written unless encoding succeeds.
pub fn compress_to<W: Write>(
    mode: Mode,
    config: &CompressConfig,
    input: &[u8],
    mut output: W,
) -> Result<CompressStats> {
    let (data, stats) = mode.encoder(config).encode_with_stats(input)?;
    output.write_all(&data)?;
    output.flush()?;
    Ok(stats)
}

/// Zero-pad `data` to a multiple of four bytes, returning the bytes added
pub fn pad_to_word(data: &mut Vec<u8>) -> usize {
    let padding = (4 - data.len() % 4) % 4;
    data.resize(data.len() + padding, 0);
    padding
}

/// Reject input the header cannot describe
pub(crate) fn check_input(input: &[u8]) -> Result<()> {
    if input.is_empty() {
        return Err(Error::EmptyInput);
    }
    if input.len() > MAX_DECOMPRESSED_SIZE {
        return Err(Error::InputTooLarge { size: input.len(), max: MAX_DECOMPRESSED_SIZE });
    }
    Ok(())
}
