// In: src/bridge/format.rs

//! Defines all on-disk constants for the chunk file format.
//! This is the single source of truth for the header frame, the body preamble
//! and the trailer layout shared by every decoder stage.

use serde::Serialize;

use crate::chunk_pipeline::model::DecodeWarning;
use crate::codec::{Codec, FormatVersion};
use crate::kernels::checksum::ChecksumStatus;

//==================================================================================
// I. Header Frame
//==================================================================================

/// Size of each big-endian `u32` length field framing the header metadata.
pub const HEADER_LEN_FIELD: usize = 4;

//==================================================================================
// II. Body Preamble
//==================================================================================

/// The magic number opening every chunk body, stored big-endian.
pub const CHUNK_MAGIC: u32 = 0x012E_E56A;
pub const MAGIC_LEN: usize = 4;
/// Magic + format byte + code byte. Payloads and metadata start at or after it.
pub const BODY_PREAMBLE_LEN: usize = MAGIC_LEN + 2;

//==================================================================================
// III. Trailer
//==================================================================================

/// Big-endian `u64` offset of the metadata region, the last bytes of the body.
pub const META_OFFSET_LEN: usize = 8;
/// Big-endian CRC32C, used both after the metadata region and after each payload.
pub const CHECKSUM_LEN: usize = 4;

/// Metadata checksum + metadata offset, for every format variant.
pub const TRAILER_LEN: usize = CHECKSUM_LEN + META_OFFSET_LEN;

/// Reads a big-endian `u32` at `pos`, if the slice is long enough.
pub(crate) fn be_u32_at(bytes: &[u8], pos: usize) -> Option<u32> {
    let end = pos.checked_add(4)?;
    let raw: [u8; 4] = bytes.get(pos..end)?.try_into().ok()?;
    Some(u32::from_be_bytes(raw))
}

/// Reads a big-endian `u64` at `pos`, if the slice is long enough.
pub(crate) fn be_u64_at(bytes: &[u8], pos: usize) -> Option<u64> {
    let end = pos.checked_add(8)?;
    let raw: [u8; 8] = bytes.get(pos..end)?.try_into().ok()?;
    Some(u64::from_be_bytes(raw))
}

//==================================================================================
// IV. Chunk Summary
//==================================================================================

/// Totals for one decoded chunk file, as returned by `analyze_chunk`.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ChunkSummary {
    pub user_id: String,
    pub version: FormatVersion,
    pub codec: Codec,
    /// Header frame size, including both length fields.
    pub header_size: usize,
    pub body_size: usize,
    pub blocks: usize,
    pub failed_blocks: usize,
    pub entries: usize,
    /// Sum of the compressed payload lengths.
    pub compressed_size: u64,
    /// Sum of the decompressed block lengths.
    pub uncompressed_size: u64,
    pub metadata_checksum: ChecksumStatus,
    pub bad_block_checksums: usize,
    pub warnings: Vec<DecodeWarning>,
}

impl ChunkSummary {
    /// Uncompressed over compressed payload size; `None` for an empty chunk.
    pub fn compression_ratio(&self) -> Option<f64> {
        if self.compressed_size == 0 {
            return None;
        }
        Some(self.uncompressed_size as f64 / self.compressed_size as f64)
    }
}
