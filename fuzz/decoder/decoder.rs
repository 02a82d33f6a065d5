#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    // Just no panic
    let mut options = texdec::Options::default();
    options.memory_limit = 16 * 1024 * 1024;
    options.max_array_size = 64;

    if let Ok(mut texture) = texdec::read_with(Cursor::new(data), &options) {
        _ = texture.decode();
    }

    options.decompress = false;
    if let Ok(mut texture) = texdec::read_with(Cursor::new(data), &options) {
        _ = texture.decode();
    }
});
