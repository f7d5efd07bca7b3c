//! Stage 2: load the body into memory and validate its preamble.
//!
//! The metadata directory is addressed by an offset stored at the very end of the
//! body, so nothing can be parsed until the whole body has been buffered.

use std::io::Read;

use crate::bridge::format::{be_u32_at, BODY_PREAMBLE_LEN, CHUNK_MAGIC, MAGIC_LEN};
use crate::chunk_pipeline::header::read_exactly;
use crate::codec::{Codec, FormatVersion};
use crate::config::InspectConfig;
use crate::error::InspectError;

/// The owned body buffer plus the format variant and codec its preamble selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkBody {
    bytes: Vec<u8>,
    version: FormatVersion,
    codec: Codec,
}

impl ChunkBody {
    /// Reads exactly `data_length` bytes from `reader` and validates them.
    pub fn load<R: Read>(
        reader: &mut R,
        data_length: u32,
        config: &InspectConfig,
    ) -> Result<Self, InspectError> {
        if data_length > config.max_body_len {
            return Err(InspectError::MalformedField {
                field: "data_length",
                reason: format!(
                    "{} exceeds the maximum allowed body size ({})",
                    data_length, config.max_body_len
                ),
            });
        }
        let bytes = read_exactly(reader, data_length as usize, "chunk body")?;
        Self::from_bytes(bytes)
    }

    /// Validates an already-buffered body: magic number, then `(format, code)`.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, InspectError> {
        if bytes.len() < BODY_PREAMBLE_LEN {
            return Err(InspectError::Truncated {
                what: "body preamble",
                expected: BODY_PREAMBLE_LEN as u64,
                got: bytes.len() as u64,
            });
        }

        let magic = be_u32_at(&bytes, 0).unwrap_or_default();
        if magic != CHUNK_MAGIC {
            return Err(InspectError::BadMagic(magic));
        }

        let format = bytes[MAGIC_LEN];
        let code = bytes[MAGIC_LEN + 1];
        let (version, codec) = Codec::resolve(format, code)?;

        log::debug!(
            "loaded {}-byte chunk body: format {:?}, codec {}",
            bytes.len(),
            version,
            codec
        );

        Ok(Self {
            bytes,
            version,
            codec,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn version(&self) -> FormatVersion {
        self.version
    }

    pub fn codec(&self) -> Codec {
        self.codec
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}
