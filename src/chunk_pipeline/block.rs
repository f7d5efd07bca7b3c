//! Stage 4: materialize one block from its descriptor.
//!
//! A block never owns its compressed payload. It records where the payload sits
//! in the body buffer, and the decoded chunk (which owns that buffer) hands out
//! the slice on request.

use crate::bridge::format::{be_u32_at, CHECKSUM_LEN};
use crate::chunk_pipeline::body::ChunkBody;
use crate::chunk_pipeline::directory::BlockDescriptor;
use crate::chunk_pipeline::entries::{decode_entries, Entry};
use crate::config::{ChecksumPolicy, InspectConfig};
use crate::error::InspectError;
use crate::kernels::checksum::{self, ChecksumStatus, Sha256Digest};

//==================================================================================
// Public Structs
//==================================================================================

/// The location of a block's compressed payload inside the body buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadSpan {
    pub offset: usize,
    pub length: usize,
}

impl PayloadSpan {
    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}

/// One decoded block.
///
/// Optional fields stay `None` when the step producing them was never reached
/// because an earlier step failed.
#[derive(Debug)]
pub struct Block {
    /// Position in the directory.
    pub index: usize,
    pub descriptor: BlockDescriptor,
    /// `None` when the descriptor points outside the body.
    pub payload: Option<PayloadSpan>,
    pub stored_checksum: Option<u32>,
    pub computed_checksum: Option<u32>,
    pub compressed_digest: Option<Sha256Digest>,
    pub decompressed_digest: Option<Sha256Digest>,
    pub decompressed_len: Option<usize>,
    /// Entries in on-disk order. When `failure` is set these are the entries
    /// decoded before it.
    pub entries: Vec<Entry>,
    pub failure: Option<InspectError>,
}

impl Block {
    fn new(index: usize, descriptor: BlockDescriptor) -> Self {
        Self {
            index,
            descriptor,
            payload: None,
            stored_checksum: None,
            computed_checksum: None,
            compressed_digest: None,
            decompressed_digest: None,
            decompressed_len: None,
            entries: Vec::new(),
            failure: None,
        }
    }

    pub fn checksum_status(&self) -> ChecksumStatus {
        ChecksumStatus::compare(self.stored_checksum, self.computed_checksum)
    }

    pub fn is_ok(&self) -> bool {
        self.failure.is_none()
    }
}

//==================================================================================
// Core Implementation
//==================================================================================

/// Slices, checksums, digests, decompresses and decodes one block.
///
/// Never fails as a whole: any error is recorded on the returned block, and the
/// caller decides what a failed block means for the chunk.
pub fn materialize_block(
    body: &ChunkBody,
    index: usize,
    descriptor: BlockDescriptor,
    config: &InspectConfig,
) -> Block {
    let mut block = Block::new(index, descriptor);
    if let Err(e) = fill(&mut block, body, config) {
        log::debug!("block {} failed: {}", index, e);
        block.failure = Some(e);
    }

    log_metric!(
        "event" = "block_materialized",
        "block" = index,
        "compressed_len" = descriptor.data_length,
        "decompressed_len" = block.decompressed_len.unwrap_or_default(),
        "entries" = block.entries.len(),
        "ok" = block.is_ok()
    );
    block
}

fn fill(block: &mut Block, body: &ChunkBody, config: &InspectConfig) -> Result<(), InspectError> {
    let index = block.index;
    let bytes = body.bytes();

    let span = payload_span(index, &block.descriptor, bytes.len())?;
    block.payload = Some(span);
    let payload = &bytes[span.offset..span.end()];

    block.compressed_digest = Some(checksum::sha256(payload));

    let stored = be_u32_at(bytes, span.end());
    let computed = checksum::crc32c(payload);
    block.stored_checksum = stored;
    block.computed_checksum = Some(computed);

    if config.checksum_policy == ChecksumPolicy::Enforce {
        if let Some(stored) = stored.filter(|s| *s != computed) {
            return Err(InspectError::ChecksumMismatch {
                region: format!("block {}", index),
                stored,
                computed,
            });
        }
    }

    let plain = body
        .codec()
        .decompress(payload, config.max_block_decompressed_len)
        .map_err(|e| match e {
            InspectError::Io(io) => InspectError::DecodeError {
                block: index,
                reason: io.to_string(),
            },
            other => other,
        })?;

    block.decompressed_digest = Some(checksum::sha256(&plain));
    block.decompressed_len = Some(plain.len());

    let (entries, failure) = decode_entries(&plain);
    block.entries = entries;
    match failure {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Bounds-checks a descriptor's payload plus its checksum trailer.
fn payload_span(
    index: usize,
    descriptor: &BlockDescriptor,
    body_len: usize,
) -> Result<PayloadSpan, InspectError> {
    let trailer = CHECKSUM_LEN as u64;
    let offset = descriptor.data_offset;
    let end = offset.checked_add(descriptor.data_length);

    match end.and_then(|e| e.checked_add(trailer)) {
        Some(required) if required <= body_len as u64 => Ok(PayloadSpan {
            offset: offset as usize,
            length: descriptor.data_length as usize,
        }),
        _ => Err(InspectError::BlockOutOfBounds {
            block: index,
            offset,
            end: end.unwrap_or(u64::MAX),
            body_len,
        }),
    }
}
