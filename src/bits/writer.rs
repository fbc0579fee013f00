/// Output sink for BIOS compressed streams
///
/// Bytes and little-endian integers are appended directly. Bitstreams are
/// packed into 32-bit little-endian words, filling each word from bit 31
/// downwards, which is the order the BIOS Huffman routine consumes them.
pub struct BitWriter {
    /// Accumulated output bytes
    output: Vec<u8>,
    /// Current word being built
    current_word: u32,
    /// Bits written to current word (0-31)
    bits_in_word: u8,
}

impl BitWriter {
    pub fn new() -> Self {
        Self { output: Vec::with_capacity(65536), current_word: 0, bits_in_word: 0 }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { output: Vec::with_capacity(capacity), current_word: 0, bits_in_word: 0 }
    }

    /// Write a single bit into the current word, MSB first
    #[inline]
    pub fn write_bit(&mut self, bit: bool) {
        if bit {
            self.current_word |= 1 << (31 - self.bits_in_word);
        }
        self.bits_in_word += 1;

        if self.bits_in_word == 32 {
            self.flush_word();
        }
    }

    /// Write the low `n` bits (0-64) of `code`, most significant first
    pub fn write_bits(&mut self, code: u64, n: u8) {
        debug_assert!(n <= 64);

        for i in (0..n).rev() {
            self.write_bit((code >> i) & 1 == 1);
        }
    }

    /// Flush a partially filled word, zero-filling its low bits
    pub fn align_to_word(&mut self) {
        if self.bits_in_word > 0 {
            self.flush_word();
        }
    }

    fn flush_word(&mut self) {
        self.output.extend_from_slice(&self.current_word.to_le_bytes());
        self.current_word = 0;
        self.bits_in_word = 0;
    }

    /// Write a raw byte (no bitstream word may be pending)
    pub fn write_byte(&mut self, byte: u8) {
        debug_assert_eq!(self.bits_in_word, 0, "byte write inside a bitstream word");
        self.output.push(byte);
    }

    /// Write a 16-bit value in little-endian
    pub fn write_u16_le(&mut self, value: u16) {
        self.write_bytes(&value.to_le_bytes());
    }

    /// Write a 32-bit value in little-endian
    pub fn write_u32_le(&mut self, value: u32) {
        self.write_bytes(&value.to_le_bytes());
    }

    /// Write raw bytes
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        debug_assert_eq!(self.bits_in_word, 0, "byte write inside a bitstream word");
        self.output.extend_from_slice(bytes);
    }

    /// Finish and return the output bytes
    pub fn finish(mut self) -> Vec<u8> {
        self.align_to_word();
        self.output
    }

    /// Get current output length in bytes (including a partial word)
    pub fn len(&self) -> usize {
        self.output.len() + if self.bits_in_word > 0 { 4 } else { 0 }
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.output.is_empty() && self.bits_in_word == 0
    }

    /// Peek at output without consuming
    pub fn as_bytes(&self) -> &[u8] {
        &self.output
    }
}

impl Default for BitWriter {
    fn default() -> Self {
        Self::new()
    }
}
