//! The decoded chunk and the warnings attached to it.

use serde::Serialize;
use std::fmt;

use crate::chunk_pipeline::block::Block;
use crate::chunk_pipeline::entries::Entry;
use crate::codec::{Codec, FormatVersion};
use crate::kernels::checksum::ChecksumStatus;

//==================================================================================
// Warnings
//==================================================================================

/// A non-fatal finding. Decoding continued past it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecodeWarning {
    MetadataChecksumMismatch { stored: u32, computed: u32 },
    BlockChecksumMismatch { block: usize, stored: u32, computed: u32 },
    /// The block was isolated; `reason` is the rendered error.
    BlockFailed { block: usize, reason: String },
    EntryCountMismatch { block: usize, declared: u64, decoded: usize },
    InvertedTimeBounds { block: usize, min_t: i64, max_t: i64 },
    EntryOutsideTimeBounds {
        block: usize,
        entry: usize,
        timestamp: i64,
        min_t: i64,
        max_t: i64,
    },
}

impl fmt::Display for DecodeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeWarning::MetadataChecksumMismatch { stored, computed } => write!(
                f,
                "metadata checksum mismatch: stored {:08x}, computed {:08x}",
                stored, computed
            ),
            DecodeWarning::BlockChecksumMismatch {
                block,
                stored,
                computed,
            } => write!(
                f,
                "block {} checksum mismatch: stored {:08x}, computed {:08x}",
                block, stored, computed
            ),
            DecodeWarning::BlockFailed { block, reason } => {
                write!(f, "block {} skipped: {}", block, reason)
            }
            DecodeWarning::EntryCountMismatch {
                block,
                declared,
                decoded,
            } => write!(
                f,
                "block {} declares {} entries but {} were decoded",
                block, declared, decoded
            ),
            DecodeWarning::InvertedTimeBounds { block, min_t, max_t } => {
                write!(f, "block {} has minT {} after maxT {}", block, min_t, max_t)
            }
            DecodeWarning::EntryOutsideTimeBounds {
                block,
                entry,
                timestamp,
                min_t,
                max_t,
            } => write!(
                f,
                "block {} entry {} at {} lies outside [{}, {}]",
                block, entry, timestamp, min_t, max_t
            ),
        }
    }
}

//==================================================================================
// DecodedChunk
//==================================================================================

/// A fully decoded chunk body.
///
/// Owns the body buffer; blocks refer into it by offset and length.
#[derive(Debug)]
pub struct DecodedChunk {
    pub version: FormatVersion,
    pub codec: Codec,
    pub(crate) body: Vec<u8>,
    pub meta_offset: u64,
    pub metadata_checksum: u32,
    pub computed_metadata_checksum: u32,
    /// Directory order, which is on-disk order.
    pub blocks: Vec<Block>,
    pub warnings: Vec<DecodeWarning>,
}

impl DecodedChunk {
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The compressed payload of `block`, borrowed from the body buffer.
    pub fn payload(&self, block: &Block) -> Option<&[u8]> {
        let span = block.payload?;
        self.body.get(span.offset..span.end())
    }

    pub fn metadata_checksum_status(&self) -> ChecksumStatus {
        ChecksumStatus::compare(
            Some(self.metadata_checksum),
            Some(self.computed_metadata_checksum),
        )
    }

    /// Every decoded entry, block by block, in on-disk order.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> + '_ {
        self.blocks.iter().flat_map(|b| b.entries.iter())
    }

    pub fn total_entries(&self) -> usize {
        self.blocks.iter().map(|b| b.entries.len()).sum()
    }

    pub fn failed_blocks(&self) -> impl Iterator<Item = &Block> + '_ {
        self.blocks.iter().filter(|b| !b.is_ok())
    }

    /// Sum of the declared compressed payload lengths.
    pub fn compressed_len(&self) -> u64 {
        self.blocks.iter().map(|b| b.descriptor.data_length).sum()
    }

    /// Sum of the decompressed lengths of blocks that got that far.
    pub fn decompressed_len(&self) -> u64 {
        self.blocks
            .iter()
            .filter_map(|b| b.decompressed_len)
            .map(|n| n as u64)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_display() {
        let w = DecodeWarning::BlockChecksumMismatch {
            block: 2,
            stored: 0xDEAD_BEEF,
            computed: 1,
        };
        assert_eq!(
            w.to_string(),
            "block 2 checksum mismatch: stored deadbeef, computed 00000001"
        );

        let w = DecodeWarning::EntryCountMismatch {
            block: 0,
            declared: 3,
            decoded: 2,
        };
        assert_eq!(w.to_string(), "block 0 declares 3 entries but 2 were decoded");
    }

    #[test]
    fn test_warning_serializes_with_kind_tag() {
        let w = DecodeWarning::InvertedTimeBounds {
            block: 1,
            min_t: 10,
            max_t: 5,
        };
        let v = serde_json::to_value(&w).unwrap();
        assert_eq!(v["kind"], "inverted_time_bounds");
        assert_eq!(v["min_t"], 10);
    }
}
