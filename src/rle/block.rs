use crate::bits::BitWriter;
use crate::error::{Error, Result};

/// Shortest run worth encoding as a run block
pub const MIN_RUN: usize = 3;

/// Longest run a single block can expand to
pub const MAX_RUN: usize = 130;

/// Longest literal block
pub const MAX_RAW: usize = 128;

/// Flag bit marking a run block
const RUN_FLAG: u8 = 0x80;

/// A single RLE block
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RleBlock {
    /// `length` repetitions of `byte`
    Run { byte: u8, length: usize },
    /// Bytes copied verbatim
    Raw(Vec<u8>),
}

impl RleBlock {
    /// Returns the uncompressed size this block represents
    pub fn uncompressed_size(&self) -> usize {
        match self {
            RleBlock::Run { length, .. } => *length,
            RleBlock::Raw(data) => data.len(),
        }
    }

    /// Returns the encoded size of this block in bytes
    pub fn encoded_size(&self) -> usize {
        match self {
            RleBlock::Run { .. } => 2,
            RleBlock::Raw(data) => 1 + data.len(),
        }
    }

    /// Check the length bounds the flag byte can express
    pub fn validate(&self) -> Result<()> {
        match self {
            RleBlock::Run { length, .. } => {
                if !(MIN_RUN..=MAX_RUN).contains(length) {
                    return Err(Error::RunLengthOutOfRange(*length));
                }
            }
            RleBlock::Raw(data) => {
                if !(1..=MAX_RAW).contains(&data.len()) {
                    return Err(Error::LiteralLengthOutOfRange(data.len()));
                }
            }
        }
        Ok(())
    }

    /// Write the flag byte and data bytes
    ///
    /// ```text
    /// Bit 0-6   Length (run: N-3, raw: N-1)
    /// Bit 7     Flag (0=raw, 1=run)
    /// ```
    pub fn write(&self, writer: &mut BitWriter) -> Result<()> {
        self.validate()?;

        match self {
            RleBlock::Run { byte, length } => {
                writer.write_byte(RUN_FLAG | (length - MIN_RUN) as u8);
                writer.write_byte(*byte);
            }
            RleBlock::Raw(data) => {
                writer.write_byte((data.len() - 1) as u8);
                writer.write_bytes(data);
            }
        }
        Ok(())
    }
}
