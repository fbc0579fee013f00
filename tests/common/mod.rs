//! Reference decoders mirroring the BIOS decompression routines.
//!
//! Test-only: they exist to check that encoded streams expand back to the
//! original bytes exactly as the fixed-function decoders would expand them.
#![allow(dead_code)]

/// Read the common header: (type, parameter, decompressed size)
pub fn parse_header(data: &[u8]) -> (u8, u8, usize) {
    let word = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
    (((word >> 4) & 0x0F) as u8, (word & 0x0F) as u8, (word >> 8) as usize)
}

/// Decode any supported stream, dispatching on the header type
pub fn decode(data: &[u8]) -> Vec<u8> {
    match parse_header(data).0 {
        1 => decode_lz77(data),
        2 => decode_huffman(data),
        3 => decode_rle(data),
        other => panic!("unknown compression type {other}"),
    }
}

pub fn decode_rle(data: &[u8]) -> Vec<u8> {
    let (kind, _, size) = parse_header(data);
    assert_eq!(kind, 3);

    let mut out = Vec::with_capacity(size);
    let mut pos = 4;
    while out.len() < size {
        let flag = data[pos];
        pos += 1;
        if flag & 0x80 != 0 {
            let len = (flag & 0x7F) as usize + 3;
            out.extend(std::iter::repeat(data[pos]).take(len));
            pos += 1;
        } else {
            let len = flag as usize + 1;
            out.extend_from_slice(&data[pos..pos + len]);
            pos += len;
        }
    }
    assert_eq!(pos, data.len(), "trailing bytes after RLE stream");
    out
}

pub fn decode_lz77(data: &[u8]) -> Vec<u8> {
    let (kind, _, size) = parse_header(data);
    assert_eq!(kind, 1);

    let mut out: Vec<u8> = Vec::with_capacity(size);
    let mut pos = 4;
    'groups: while out.len() < size {
        let flags = data[pos];
        pos += 1;
        for bit in 0..8 {
            if out.len() >= size {
                break 'groups;
            }
            if flags & (0x80 >> bit) != 0 {
                let len = (data[pos] >> 4) as usize + 3;
                let disp = (((data[pos] & 0x0F) as usize) << 8) | data[pos + 1] as usize;
                pos += 2;
                let start = out.len() - disp - 1;
                // Byte at a time so overlapping copies repeat
                for i in 0..len {
                    out.push(out[start + i]);
                }
            } else {
                out.push(data[pos]);
                pos += 1;
            }
        }
    }
    assert_eq!(pos, data.len(), "trailing bytes after LZ77 stream");
    out
}

pub fn decode_huffman(data: &[u8]) -> Vec<u8> {
    let (kind, bits, size) = parse_header(data);
    assert_eq!(kind, 2);
    assert!(bits == 4 || bits == 8);

    let tree_base = 4;
    let stream_start = tree_base + (data[tree_base] as usize + 1) * 2;
    assert_eq!(stream_start % 4, 0, "bitstream not word aligned");

    let root = tree_base + 1;
    let mut node = root;
    let mut out = Vec::with_capacity(size);
    let mut pending_nibble: Option<u8> = None;

    'words: for word in data[stream_start..].chunks(4) {
        let word = u32::from_le_bytes([word[0], word[1], word[2], word[3]]);
        for bit in (0..32).rev() {
            let entry = data[node];
            let offset = (entry & 0x3F) as usize;
            let child0 = (node & !1) + offset * 2 + 2;
            let (child, is_leaf) = if (word >> bit) & 1 == 0 {
                (child0, entry & 0x80 != 0)
            } else {
                (child0 + 1, entry & 0x40 != 0)
            };

            if !is_leaf {
                node = child;
                continue;
            }

            let symbol = data[child];
            node = root;
            if bits == 8 {
                out.push(symbol);
            } else {
                match pending_nibble.take() {
                    None => pending_nibble = Some(symbol),
                    Some(low) => out.push(low | (symbol << 4)),
                }
            }
            if out.len() == size {
                break 'words;
            }
        }
    }
    assert_eq!(out.len(), size, "bitstream ended early");
    out
}

/// Generate random data using a simple PRNG
pub fn generate_random_data(size: usize, seed: u64) -> Vec<u8> {
    let mut data = Vec::with_capacity(size);
    let mut state = seed;
    for _ in 0..size {
        // Simple xorshift PRNG
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        data.push((state & 0xFF) as u8);
    }
    data
}

/// Generate data drawn from a small skewed alphabet
pub fn generate_skewed_data(size: usize, seed: u64) -> Vec<u8> {
    generate_random_data(size, seed)
        .into_iter()
        .map(|b| match b {
            0..=127 => b'A',
            128..=191 => b'B',
            192..=223 => b'C',
            224..=239 => b'D',
            _ => b'E' + (b & 0x07),
        })
        .collect()
}

/// Generate tile-like data: runs, repeated rows and noise
pub fn generate_tile_data(size: usize) -> Vec<u8> {
    let row = [0x11, 0x22, 0x33, 0x44, 0x44, 0x33, 0x22, 0x11];
    let mut data = Vec::with_capacity(size);
    let mut i = 0usize;
    while data.len() < size {
        match i % 4 {
            0 => data.extend(std::iter::repeat(0u8).take(40)),
            1 | 2 => data.extend_from_slice(&row),
            _ => data.extend((0..12).map(|j| 0x80 | ((i * 31 + j * 7) % 16) as u8)),
        }
        i += 1;
    }
    data.truncate(size);
    data
}
