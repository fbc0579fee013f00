use tracing::{debug, trace};

use super::matcher::MatchFinder;
use super::tokens::{group_flags, Lz77Token};
use crate::bits::BitWriter;
use crate::error::Result;
use crate::header::{FormatHeader, FormatType};
use crate::{check_input, CompressConfig, CompressStats, Encoder};

/// Tokens covered by one flag byte
const GROUP_SIZE: usize = 8;

/// Greedy LZ77 encoder with a 4096-byte window
#[derive(Clone, Debug)]
pub struct Lz77Encoder {
    finder: MatchFinder,
    num_threads: usize,
}

impl Lz77Encoder {
    pub fn new(vram_safe: bool) -> Self {
        Self { finder: MatchFinder::new(vram_safe), num_threads: 1 }
    }

    pub fn from_config(config: &CompressConfig) -> Self {
        Self { finder: MatchFinder::new(config.vram_safe), num_threads: config.num_threads }
    }

    /// Turn input into literal and back-reference tokens
    ///
    /// At each position the longest match in the window is taken if it is at
    /// least three bytes long; otherwise a literal is emitted.
    pub fn compress(&self, input: &[u8]) -> Result<Vec<Lz77Token>> {
        // With more than one thread every position is searched up front
        let table = match self.num_threads {
            1 => None,
            n => Some(self.finder.find_all(input, n)?),
        };

        let mut tokens = Vec::with_capacity(input.len() / 2);
        let mut pos = 0;

        while pos < input.len() {
            let found = match &table {
                Some(table) => table[pos],
                None => self.finder.find(input, pos),
            };
            let token = match found {
                Some(m) => {
                    Lz77Token::BackReference { displacement: m.displacement, length: m.length }
                }
                None => Lz77Token::Literal(input[pos]),
            };
            pos += token.uncompressed_size();
            tokens.push(token);
        }

        Ok(tokens)
    }

    /// Write header, then each group of up to eight tokens behind its flag byte
    pub fn serialize(&self, tokens: &[Lz77Token], decompressed_size: usize) -> Result<Vec<u8>> {
        let header = FormatHeader::new(FormatType::Lz77, 0, decompressed_size)?;
        let body_size: usize = tokens.iter().map(Lz77Token::encoded_size).sum::<usize>()
            + tokens.len().div_ceil(GROUP_SIZE);

        let mut writer = BitWriter::with_capacity(4 + body_size);
        header.write(&mut writer);

        for group in tokens.chunks(GROUP_SIZE) {
            let flags = group_flags(group);
            trace!(flags = format_args!("{flags:08b}"), tokens = group.len(), "LZ77 group");
            writer.write_byte(flags);
            for token in group {
                token.write(&mut writer)?;
            }
        }

        Ok(writer.finish())
    }
}

impl Encoder for Lz77Encoder {
    fn encode_with_stats(&self, input: &[u8]) -> Result<(Vec<u8>, CompressStats)> {
        check_input(input)?;

        let tokens = self.compress(input)?;
        let output = self.serialize(&tokens, input.len())?;

        let back_references = tokens.iter().filter(|t| t.is_back_reference()).count();
        debug!(
            tokens = tokens.len(),
            back_references,
            input_bytes = input.len(),
            output_bytes = output.len(),
            "LZ77 encode complete"
        );

        let stats = CompressStats {
            input_bytes: input.len() as u64,
            output_bytes: output.len() as u64,
            blocks: tokens.len() as u64,
            back_references: back_references as u64,
            ..Default::default()
        };
        Ok((output, stats))
    }
}
