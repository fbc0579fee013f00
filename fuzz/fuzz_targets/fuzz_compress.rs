#![no_main]

use biospack::{encode, pad_to_word, CompressConfig, Error, Mode};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // First byte picks the options, the rest is the payload
    let options = data[0];
    let mut input = data[1..].to_vec();
    if input.is_empty() {
        return;
    }
    pad_to_word(&mut input);

    let config = CompressConfig {
        vram_safe: options & 0x01 != 0,
        num_threads: if options & 0x02 != 0 { 2 } else { 1 },
    };

    for mode in [Mode::Rle, Mode::Lz77, Mode::Huffman8, Mode::Huffman4] {
        match encode(mode, &config, &input) {
            Ok(output) => {
                let size = u32::from_le_bytes([output[0], output[1], output[2], output[3]]) >> 8;
                assert_eq!(size as usize, input.len());
            }
            // Wide trees are a valid rejection; anything else is a bug
            Err(Error::TreeTooWide { .. }) => {}
            Err(e) => panic!("{mode:?} failed: {e}"),
        }
    }
});
