// In: src/codec.rs

//! The codec registry: a fixed table mapping the body's `(format, code)` selector
//! to a decompression family.
//!
//! Each `Codec` variant has exactly one capability, building a decompressing
//! byte source from a compressed one. There is no trait hierarchy; dispatch is a
//! single `match` over the variant.

use serde::Serialize;
use std::fmt;
use std::io::Read;

use crate::error::InspectError;
use crate::kernels;

//==================================================================================
// 1. Format & Codec Enumerations
//==================================================================================

/// Format byte selecting the legacy single-codec variant. Payloads are always gzip.
pub const FORMAT_LEGACY: u8 = 1;
/// Format byte selecting the codec from the code byte.
pub const FORMAT_CODED: u8 = 2;

/// The body variant, derived from the format byte.
///
/// Both variants share one layout: a code byte after the format byte, a CRC32C
/// after every payload and a 12-byte trailer. They differ only in how the codec
/// is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatVersion {
    /// Format 1: gzip payloads; the code byte is read and ignored.
    Legacy,
    /// Format 2: codec from the code byte.
    Coded,
}

impl FormatVersion {
    pub fn from_byte(format: u8) -> Option<Self> {
        match format {
            FORMAT_LEGACY => Some(FormatVersion::Legacy),
            FORMAT_CODED => Some(FormatVersion::Coded),
            _ => None,
        }
    }

    pub fn as_byte(self) -> u8 {
        match self {
            FormatVersion::Legacy => FORMAT_LEGACY,
            FormatVersion::Coded => FORMAT_CODED,
        }
    }
}

/// Every compression codec the storage engine can write.
#[allow(non_camel_case_types)]
///
/// Serializes under the same name `Display` prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Codec {
    #[serde(rename = "none")]
    None,
    #[serde(rename = "gzip")]
    Gzip,
    /// Legacy alias of `None`.
    #[serde(rename = "dumb")]
    Dumb,
    #[serde(rename = "lz4")]
    Lz4_64k,
    #[serde(rename = "snappy")]
    Snappy,
    #[serde(rename = "lz4-256k")]
    Lz4_256k,
    #[serde(rename = "lz4-1M")]
    Lz4_1M,
    #[serde(rename = "lz4-4M")]
    Lz4_4M,
    #[serde(rename = "flate")]
    Flate,
    #[serde(rename = "zstd")]
    Zstd,
}

/// The registry table, ordered by code.
pub const CODECS: [Codec; 10] = [
    Codec::None,
    Codec::Gzip,
    Codec::Dumb,
    Codec::Lz4_64k,
    Codec::Snappy,
    Codec::Lz4_256k,
    Codec::Lz4_1M,
    Codec::Lz4_4M,
    Codec::Flate,
    Codec::Zstd,
];

impl Codec {
    pub fn code(self) -> u8 {
        match self {
            Codec::None => 0,
            Codec::Gzip => 1,
            Codec::Dumb => 2,
            Codec::Lz4_64k => 3,
            Codec::Snappy => 4,
            Codec::Lz4_256k => 5,
            Codec::Lz4_1M => 6,
            Codec::Lz4_4M => 7,
            Codec::Flate => 8,
            Codec::Zstd => 9,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Codec::None => "none",
            Codec::Gzip => "gzip",
            Codec::Dumb => "dumb",
            Codec::Lz4_64k => "lz4",
            Codec::Snappy => "snappy",
            Codec::Lz4_256k => "lz4-256k",
            Codec::Lz4_1M => "lz4-1M",
            Codec::Lz4_4M => "lz4-4M",
            Codec::Flate => "flate",
            Codec::Zstd => "zstd",
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        CODECS.iter().copied().find(|c| c.code() == code)
    }

    /// Resolves the body's `(format, code)` selector.
    ///
    /// Format 1 forces gzip regardless of `code`; format 2 looks `code` up in the
    /// table. Anything else is an `UnknownCodec`.
    pub fn resolve(format: u8, code: u8) -> Result<(FormatVersion, Codec), InspectError> {
        match FormatVersion::from_byte(format) {
            Some(FormatVersion::Legacy) => Ok((FormatVersion::Legacy, Codec::Gzip)),
            Some(FormatVersion::Coded) => Codec::from_code(code)
                .map(|codec| (FormatVersion::Coded, codec))
                .ok_or(InspectError::UnknownCodec { format, code }),
            None => Err(InspectError::UnknownCodec { format, code }),
        }
    }

    //==================================================================================
    // 2. The single capability: build a decompressing reader
    //==================================================================================

    /// Wraps a compressed byte source in this codec's decompressor.
    pub fn reader<'a, R: Read + 'a>(self, input: R) -> Result<Box<dyn Read + 'a>, InspectError> {
        match self {
            Codec::None | Codec::Dumb => Ok(Box::new(input)),
            Codec::Gzip => kernels::deflate::gzip_decoder(input),
            Codec::Flate => Ok(kernels::deflate::flate_decoder(input)),
            Codec::Lz4_64k | Codec::Lz4_256k | Codec::Lz4_1M | Codec::Lz4_4M => {
                Ok(kernels::lz4::decoder(input))
            }
            Codec::Snappy => Ok(kernels::snappy::decoder(input)),
            Codec::Zstd => kernels::zstd::decoder(input),
        }
    }

    /// Fully decompresses `input`, refusing to produce more than `limit` bytes.
    ///
    /// Construction failures are `CodecInitError`; anything that goes wrong while
    /// draining the stream is reported as `Io` for the caller to scope.
    pub fn decompress(self, input: &[u8], limit: usize) -> Result<Vec<u8>, InspectError> {
        let reader = self.reader(input)?;
        let mut out = Vec::new();
        reader.take(limit as u64 + 1).read_to_end(&mut out)?;
        if out.len() > limit {
            return Err(InspectError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("{} stream expands beyond the {}-byte limit", self, limit),
            )));
        }
        Ok(out)
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

//==================================================================================
// 3. Test-only compressors, so fixtures can build payloads for every codec
//==================================================================================

#[cfg(test)]
impl Codec {
    pub(crate) fn compress(self, bytes: &[u8]) -> Vec<u8> {
        match self {
            Codec::None | Codec::Dumb => bytes.to_vec(),
            Codec::Gzip => kernels::deflate::gzip_encode(bytes),
            Codec::Flate => kernels::deflate::flate_encode(bytes),
            Codec::Lz4_64k | Codec::Lz4_256k | Codec::Lz4_1M | Codec::Lz4_4M => {
                kernels::lz4::encode(bytes)
            }
            Codec::Snappy => kernels::snappy::encode(bytes),
            Codec::Zstd => kernels::zstd::encode(bytes),
        }
    }
}
