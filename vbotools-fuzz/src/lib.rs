//! Fuzzing entry points for vbotools-core
//!
//! To use with cargo-fuzz:
//! 1. Install cargo-fuzz: cargo install cargo-fuzz
//! 2. Run fuzzer: cargo fuzz run fuzz_decode

pub fn fuzz_decode(data: &[u8]) {
    use vbotools_core::decoder::decode_bytes;

    // Try to decode - should never panic
    let _ = decode_bytes(data);
}

pub fn fuzz_parse(data: &[u8]) {
    use vbotools_core::{
        encoder::encode_str,
        sync::VideoSync,
        vbo::{decode_text, parse_reader},
        VideoContainer,
    };

    // Parse, encode and synchronize - should never panic
    if let Ok(mut store) = parse_reader(data) {
        let _ = encode_str(&decode_text(data));
        let _ = vbotools_core::Route::extract(&store);
        let _ = VideoSync::new(-1234, "fuzz", VideoContainer::Mp4).align(&mut store);
        let _ = VideoSync::new(i32::MIN, "fuzz", VideoContainer::Avi).align(&mut store);
    }
}
