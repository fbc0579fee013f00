use crate::bits::BitWriter;
use crate::error::{Error, Result};

/// Shortest back-reference the format can express
pub const MIN_MATCH: usize = 3;

/// Longest back-reference the format can express
pub const MAX_MATCH: usize = 18;

/// Largest displacement (12 bits)
pub const MAX_DISPLACEMENT: usize = 4095;

/// Represents a single block in the LZ77 stream
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lz77Token {
    /// A literal byte
    Literal(u8),
    /// Copy `length` bytes starting `displacement + 1` bytes behind the cursor
    BackReference { displacement: u16, length: u8 },
}

impl Lz77Token {
    /// Returns the uncompressed size this token represents
    pub fn uncompressed_size(&self) -> usize {
        match self {
            Lz77Token::Literal(_) => 1,
            Lz77Token::BackReference { length, .. } => *length as usize,
        }
    }

    /// Flag bit for this token in its group's flag byte
    pub fn is_back_reference(&self) -> bool {
        matches!(self, Lz77Token::BackReference { .. })
    }

    /// Encoded size in bytes, excluding the shared flag byte
    pub fn encoded_size(&self) -> usize {
        match self {
            Lz77Token::Literal(_) => 1,
            Lz77Token::BackReference { .. } => 2,
        }
    }

    /// Write the token body
    ///
    /// ```text
    /// Literal:        Bit 0-7   data byte
    /// Back-reference: Bit 0-3   displacement MSBs
    ///                 Bit 4-7   length - 3
    ///                 Bit 8-15  displacement LSBs
    /// ```
    pub fn write(&self, writer: &mut BitWriter) -> Result<()> {
        match *self {
            Lz77Token::Literal(byte) => writer.write_byte(byte),
            Lz77Token::BackReference { displacement, length } => {
                let displacement = displacement as usize;
                let length = length as usize;
                if displacement > MAX_DISPLACEMENT {
                    return Err(Error::DisplacementOutOfRange(displacement));
                }
                if !(MIN_MATCH..=MAX_MATCH).contains(&length) {
                    return Err(Error::MatchLengthOutOfRange(length));
                }

                writer.write_byte((((length - MIN_MATCH) << 4) | (displacement >> 8)) as u8);
                writer.write_byte((displacement & 0xFF) as u8);
            }
        }
        Ok(())
    }
}

/// Flag byte for a group of up to eight tokens, first token in bit 7
pub fn group_flags(group: &[Lz77Token]) -> u8 {
    debug_assert!(group.len() <= 8);

    group
        .iter()
        .enumerate()
        .filter(|(_, token)| token.is_back_reference())
        .fold(0u8, |flags, (i, _)| flags | (0x80 >> i))
}
