//! This module contains the Zstandard decompression kernel (codec 9).
//!
//! It is a safe, panic-free wrapper around the `zstd` crate's streaming decoder.
//! Unlike the other families, the zstd decoder allocates its context up front, so
//! construction itself can fail and is reported as a codec initialisation error.

use std::io::Read;
use zstd::stream::read::Decoder;

use crate::codec::Codec;
use crate::error::InspectError;

/// Builds a streaming zstd decompressor over `input`.
pub fn decoder<'a, R: Read + 'a>(input: R) -> Result<Box<dyn Read + 'a>, InspectError> {
    let decoder = Decoder::new(input).map_err(|e| InspectError::CodecInitError {
        codec: Codec::Zstd,
        reason: e.to_string(),
    })?;
    Ok(Box::new(decoder))
}

#[cfg(test)]
pub(crate) fn encode(bytes: &[u8]) -> Vec<u8> {
    zstd::stream::encode_all(bytes, 3).unwrap()
}

//==================================================================================
// Unit Tests
//==================================================================================
