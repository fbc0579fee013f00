use crate::bits::BitWriter;
use crate::error::{Error, Result};

/// Header size in bytes, common to every format
pub const HEADER_SIZE: usize = 4;

/// Largest decompressed size the 24-bit size field can hold
pub const MAX_DECOMPRESSED_SIZE: usize = 0x00FF_FFFF;

/// Compression type stored in bits 4-7 of the header
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum FormatType {
    Lz77 = 1,
    Huffman = 2,
    Rle = 3,
}

impl FormatType {
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(Self::Lz77),
            2 => Some(Self::Huffman),
            3 => Some(Self::Rle),
            _ => None,
        }
    }

    pub fn tag(&self) -> u8 {
        *self as u8
    }
}

/// Common 4-byte header
///
/// ```text
/// Bit 0-3   Format parameter (Huffman symbol size, otherwise 0)
/// Bit 4-7   Compression type
/// Bit 8-31  Decompressed size in bytes
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormatHeader {
    pub format: FormatType,
    pub parameter: u8,
    pub decompressed_size: u32,
}

impl FormatHeader {
    pub fn new(format: FormatType, parameter: u8, decompressed_size: usize) -> Result<Self> {
        if decompressed_size > MAX_DECOMPRESSED_SIZE {
            return Err(Error::InputTooLarge {
                size: decompressed_size,
                max: MAX_DECOMPRESSED_SIZE,
            });
        }
        debug_assert!(parameter < 16);

        Ok(Self { format, parameter, decompressed_size: decompressed_size as u32 })
    }

    /// Packed little-endian header word
    pub fn to_word(&self) -> u32 {
        (self.parameter as u32 & 0x0F)
            | ((self.format.tag() as u32) << 4)
            | (self.decompressed_size << 8)
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        self.to_word().to_le_bytes()
    }

    pub fn write(&self, writer: &mut BitWriter) {
        writer.write_u32_le(self.to_word());
    }

    /// Parse the header at the start of a compressed stream
    pub fn parse(data: &[u8]) -> Result<Self> {
        let bytes: [u8; HEADER_SIZE] = data
            .get(..HEADER_SIZE)
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| Error::InvalidHeader(format!("need 4 bytes, got {}", data.len())))?;
        let word = u32::from_le_bytes(bytes);

        let tag = ((word >> 4) & 0x0F) as u8;
        let format = FormatType::from_tag(tag)
            .ok_or_else(|| Error::InvalidHeader(format!("unknown compression type {tag}")))?;

        Ok(Self { format, parameter: (word & 0x0F) as u8, decompressed_size: word >> 8 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rle_header_bytes() {
        let header = FormatHeader::new(FormatType::Rle, 0, 10).unwrap();
        assert_eq!(header.to_bytes(), [0x30, 0x0A, 0x00, 0x00]);
    }

    #[test]
    fn test_huffman_header_bytes() {
        let header = FormatHeader::new(FormatType::Huffman, 8, 0x012345).unwrap();
        assert_eq!(header.to_bytes(), [0x28, 0x45, 0x23, 0x01]);
    }

    #[test]
    fn test_parse_roundtrip() {
        let header = FormatHeader::new(FormatType::Lz77, 0, 4096).unwrap();
        let parsed = FormatHeader::parse(&header.to_bytes()).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn test_size_limit() {
        assert!(FormatHeader::new(FormatType::Rle, 0, MAX_DECOMPRESSED_SIZE).is_ok());
        let result = FormatHeader::new(FormatType::Rle, 0, MAX_DECOMPRESSED_SIZE + 1);
        assert!(matches!(result, Err(Error::InputTooLarge { .. })));
    }

    #[test]
    fn test_parse_rejects_unknown_type() {
        let result = FormatHeader::parse(&[0x40, 0x00, 0x00, 0x00]);
        assert!(matches!(result, Err(Error::InvalidHeader(_))));
        assert!(FormatHeader::parse(&[0x30, 0x00]).is_err());
    }
}
