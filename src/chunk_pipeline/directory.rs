//! Stage 3: the metadata directory.
//!
//! Read backward from the end of the body: the last 8 bytes give the offset of
//! the metadata region and the 4 bytes before them hold the region's CRC32C.
//! Both format variants carry this trailer. The region itself is a uvarint block count followed
//! by that many fixed-shape descriptors.
//!
//! Descriptor boundaries are only known by decoding every preceding descriptor,
//! so any failure here is fatal for the file.

use serde::Serialize;
use std::io::Cursor;

use crate::bridge::format::{
    be_u32_at, be_u64_at, BODY_PREAMBLE_LEN, CHECKSUM_LEN, META_OFFSET_LEN, TRAILER_LEN,
};
use crate::chunk_pipeline::body::ChunkBody;
use crate::error::InspectError;
use crate::kernels::checksum::{self, ChecksumStatus};
use crate::kernels::{leb128, zigzag};

/// Smallest possible encoding of one descriptor: five single-byte varints.
const MIN_DESCRIPTOR_LEN: usize = 5;

/// One block's entry in the directory, exactly as stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlockDescriptor {
    /// Declared number of entries. Never used to bound entry decoding.
    pub num_entries: u64,
    /// Declared minimum entry timestamp, unix nanoseconds.
    pub min_t: i64,
    /// Declared maximum entry timestamp, unix nanoseconds.
    pub max_t: i64,
    /// Start of the compressed payload within the body.
    pub data_offset: u64,
    /// Length of the compressed payload, excluding its checksum trailer.
    pub data_length: u64,
}

/// The decoded directory and the metadata checksum pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataDirectory {
    pub meta_offset: u64,
    pub stored_checksum: u32,
    pub computed_checksum: u32,
    /// In on-disk order.
    pub descriptors: Vec<BlockDescriptor>,
}

impl MetadataDirectory {
    pub fn checksum_status(&self) -> ChecksumStatus {
        ChecksumStatus::compare(Some(self.stored_checksum), Some(self.computed_checksum))
    }
}

/// Locates, checksums and decodes the metadata directory of a loaded body.
pub fn decode_directory(body: &ChunkBody) -> Result<MetadataDirectory, InspectError> {
    let bytes = body.bytes();
    let preamble = BODY_PREAMBLE_LEN;

    if bytes.len() < preamble + TRAILER_LEN {
        return Err(InspectError::DirectoryDecodeError(format!(
            "{}-byte body cannot hold a {}-byte trailer",
            bytes.len(),
            TRAILER_LEN
        )));
    }

    let region_end = bytes.len() - TRAILER_LEN;
    let meta_offset = be_u64_at(bytes, bytes.len() - META_OFFSET_LEN).unwrap_or_default();
    if meta_offset < preamble as u64 || meta_offset > region_end as u64 {
        return Err(InspectError::DirectoryDecodeError(format!(
            "metadata offset {} outside [{}, {}]",
            meta_offset, preamble, region_end
        )));
    }

    let region = &bytes[meta_offset as usize..region_end];
    let stored_checksum = be_u32_at(bytes, bytes.len() - META_OFFSET_LEN - CHECKSUM_LEN)
        .unwrap_or_default();
    let computed_checksum = checksum::crc32c(region);

    let descriptors = decode_descriptors(region)?;

    log_metric!(
        "event" = "directory_decoded",
        "meta_offset" = meta_offset,
        "region_len" = region.len(),
        "blocks" = descriptors.len()
    );

    Ok(MetadataDirectory {
        meta_offset,
        stored_checksum,
        computed_checksum,
        descriptors,
    })
}

/// Decodes the block count and every descriptor, strictly in order.
fn decode_descriptors(region: &[u8]) -> Result<Vec<BlockDescriptor>, InspectError> {
    let mut cursor = Cursor::new(region);

    let count = leb128::decode_one::<u64>(&mut cursor).map_err(|e| {
        InspectError::DirectoryDecodeError(format!("failed to read number of blocks: {}", e))
    })?;

    // The count is untrusted; never reserve more than the region could hold.
    let plausible = region.len() / MIN_DESCRIPTOR_LEN;
    let mut descriptors = Vec::with_capacity((count as usize).min(plausible));

    for ix in 0..count {
        let descriptor = decode_descriptor(&mut cursor).map_err(|e| {
            InspectError::DirectoryDecodeError(format!("descriptor {} of {}: {}", ix, count, e))
        })?;
        descriptors.push(descriptor);
    }

    let trailing = region.len() - cursor.position() as usize;
    if trailing > 0 {
        log::debug!("ignoring {} bytes after the last block descriptor", trailing);
    }

    Ok(descriptors)
}

fn decode_descriptor(cursor: &mut Cursor<&[u8]>) -> Result<BlockDescriptor, InspectError> {
    Ok(BlockDescriptor {
        num_entries: leb128::decode_one(cursor)?,
        min_t: zigzag::decode_one(cursor)?,
        max_t: zigzag::decode_one(cursor)?,
        data_offset: leb128::decode_one(cursor)?,
        data_length: leb128::decode_one(cursor)?,
    })
}
