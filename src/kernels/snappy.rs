//! Snappy framing-format decompression kernel.
//!
//! Used both for codec 4 block payloads and for the JSON metadata inside the
//! chunk header frame.

use snap::read::FrameDecoder;
use std::io::Read;

/// Builds a streaming snappy decompressor over `input`.
pub fn decoder<'a, R: Read + 'a>(input: R) -> Box<dyn Read + 'a> {
    Box::new(FrameDecoder::new(input))
}

#[cfg(test)]
pub(crate) fn encode(bytes: &[u8]) -> Vec<u8> {
    use snap::write::FrameEncoder;
    use std::io::Write;

    let mut encoder = FrameEncoder::new(Vec::new());
    encoder.write_all(bytes).unwrap();
    match encoder.into_inner() {
        Ok(buf) => buf,
        Err(e) => panic!("snappy test encoder failed: {}", e.error()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snappy_frame_roundtrip() {
        let original = b"{\"userID\":\"fake\"}".to_vec();
        let mut out = Vec::new();
        decoder(encode(&original).as_slice())
            .read_to_end(&mut out)
            .unwrap();
        assert_eq!(out, original);
    }

    #[test]
    fn test_snappy_rejects_missing_stream_identifier() {
        let mut out = Vec::new();
        assert!(decoder(&b"plain text"[..]).read_to_end(&mut out).is_err());
    }
}
