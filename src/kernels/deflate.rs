//! DEFLATE-family decompression kernels: gzip members (codec 1 and the legacy
//! single-codec format) and raw DEFLATE streams (codec 8).
//!
//! Both are safe, panic-free wrappers around the `flate2` crate.

use flate2::read::{DeflateDecoder, GzDecoder};
use std::io::Read;

use crate::codec::Codec;
use crate::error::InspectError;

/// Builds a gzip decompressor over `input`.
///
/// The gzip header is parsed eagerly, so a payload that does not start with a
/// valid member header fails here instead of on the first read.
pub fn gzip_decoder<'a, R: Read + 'a>(input: R) -> Result<Box<dyn Read + 'a>, InspectError> {
    let decoder = GzDecoder::new(input);
    if decoder.header().is_none() {
        return Err(InspectError::CodecInitError {
            codec: Codec::Gzip,
            reason: "missing or malformed gzip header".to_string(),
        });
    }
    Ok(Box::new(decoder))
}

/// Builds a raw DEFLATE decompressor over `input`. Construction cannot fail;
/// corrupt streams surface on read.
pub fn flate_decoder<'a, R: Read + 'a>(input: R) -> Box<dyn Read + 'a> {
    Box::new(DeflateDecoder::new(input))
}

#[cfg(test)]
pub(crate) fn gzip_encode(bytes: &[u8]) -> Vec<u8> {
    use flate2::{write::GzEncoder, Compression};
    use std::io::Write;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes).unwrap();
    encoder.finish().unwrap()
}

#[cfg(test)]
pub(crate) fn flate_encode(bytes: &[u8]) -> Vec<u8> {
    use flate2::{write::DeflateEncoder, Compression};
    use std::io::Write;

    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes).unwrap();
    encoder.finish().unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gzip_roundtrip() {
        let original = b"level=info msg=\"hello\"\n".repeat(20);
        let mut out = Vec::new();
        gzip_decoder(gzip_encode(&original).as_slice())
            .unwrap()
            .read_to_end(&mut out)
            .unwrap();
        assert_eq!(out, original);
    }

    #[test]
    fn test_gzip_rejects_bad_header() {
        let result = gzip_decoder(&b"definitely not gzip"[..]);
        assert!(matches!(
            result,
            Err(InspectError::CodecInitError {
                codec: Codec::Gzip,
                ..
            })
        ));
    }

    #[test]
    fn test_flate_roundtrip() {
        let original = b"abcabcabcabc".to_vec();
        let mut out = Vec::new();
        flate_decoder(flate_encode(&original).as_slice())
            .read_to_end(&mut out)
            .unwrap();
        assert_eq!(out, original);
    }
}
