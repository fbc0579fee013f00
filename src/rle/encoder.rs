use tracing::debug;

use super::block::{RleBlock, MAX_RAW, MAX_RUN, MIN_RUN};
use crate::bits::BitWriter;
use crate::error::Result;
use crate::header::{FormatHeader, FormatType};
use crate::{check_input, CompressStats, Encoder};

/// Greedy run-length encoder
#[derive(Clone, Debug, Default)]
pub struct RleEncoder;

impl RleEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Split input into run and raw blocks
    ///
    /// Runs of three or more identical bytes (at most 130 per block) become
    /// run blocks; everything else is buffered into raw blocks of up to 128.
    pub fn compress(&self, input: &[u8]) -> Vec<RleBlock> {
        let mut blocks = Vec::new();
        let mut pending: Vec<u8> = Vec::with_capacity(MAX_RAW);
        let mut pos = 0;

        while pos < input.len() {
            let byte = input[pos];
            let run = input[pos..].iter().take(MAX_RUN).take_while(|&&b| b == byte).count();

            if run >= MIN_RUN {
                flush_raw(&mut pending, &mut blocks);
                blocks.push(RleBlock::Run { byte, length: run });
                pos += run;
            } else {
                pending.push(byte);
                if pending.len() == MAX_RAW {
                    flush_raw(&mut pending, &mut blocks);
                }
                pos += 1;
            }
        }

        flush_raw(&mut pending, &mut blocks);
        blocks
    }

    /// Write header and blocks
    pub fn serialize(&self, blocks: &[RleBlock], decompressed_size: usize) -> Result<Vec<u8>> {
        let header = FormatHeader::new(FormatType::Rle, 0, decompressed_size)?;
        let body_size: usize = blocks.iter().map(RleBlock::encoded_size).sum();

        let mut writer = BitWriter::with_capacity(4 + body_size);
        header.write(&mut writer);
        for block in blocks {
            block.write(&mut writer)?;
        }

        Ok(writer.finish())
    }
}

fn flush_raw(pending: &mut Vec<u8>, blocks: &mut Vec<RleBlock>) {
    if !pending.is_empty() {
        blocks.push(RleBlock::Raw(std::mem::take(pending)));
    }
}

impl Encoder for RleEncoder {
    fn encode_with_stats(&self, input: &[u8]) -> Result<(Vec<u8>, CompressStats)> {
        check_input(input)?;

        let blocks = self.compress(input);
        let output = self.serialize(&blocks, input.len())?;

        let runs = blocks.iter().filter(|b| matches!(b, RleBlock::Run { .. })).count();
        debug!(
            blocks = blocks.len(),
            runs,
            input_bytes = input.len(),
            output_bytes = output.len(),
            "RLE encode complete"
        );

        let stats = CompressStats {
            input_bytes: input.len() as u64,
            output_bytes: output.len() as u64,
            blocks: blocks.len() as u64,
            ..Default::default()
        };
        Ok((output, stats))
    }
}
