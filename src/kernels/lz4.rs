//! LZ4 frame decompression kernel, shared by all LZ4 codec variants.
//!
//! The variants only differ in the block size the writer chose; the frame header
//! records it, so one streaming decoder serves all of them.

use lz4_flex::frame::FrameDecoder;
use std::io::Read;

/// Builds an LZ4 frame decompressor over `input`. Frame descriptor errors surface
/// on the first read.
pub fn decoder<'a, R: Read + 'a>(input: R) -> Box<dyn Read + 'a> {
    Box::new(FrameDecoder::new(input))
}

#[cfg(test)]
pub(crate) fn encode(bytes: &[u8]) -> Vec<u8> {
    use lz4_flex::frame::FrameEncoder;
    use std::io::Write;

    let mut encoder = FrameEncoder::new(Vec::new());
    encoder.write_all(bytes).unwrap();
    encoder.finish().unwrap()
}
