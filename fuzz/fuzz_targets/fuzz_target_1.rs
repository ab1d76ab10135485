#![no_main]

use libfuzzer_sys::fuzz_target;
use peer_protocol::{decode, decode_prefix, encode, DecodeOptions};

fuzz_target!(|data: &[u8]| {
    // Decoding arbitrary input must never panic
    if let Ok(packet) = decode(data, None) {
        // Anything that decodes strictly re-encodes to the same bytes
        let bytes = encode(&packet).expect("decoded packet must encode");
        assert_eq!(&bytes[..], data);
    }

    let _ = decode_prefix(data, None, &DecodeOptions::streaming());
});
