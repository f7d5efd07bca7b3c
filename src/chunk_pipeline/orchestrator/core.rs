// In: src/chunk_pipeline/orchestrator/core.rs

use std::io::Read;

use crate::chunk_pipeline::block::{materialize_block, Block};
use crate::chunk_pipeline::body::ChunkBody;
use crate::chunk_pipeline::directory::decode_directory;
use crate::chunk_pipeline::header::ChunkHeader;
use crate::chunk_pipeline::model::{DecodeWarning, DecodedChunk};
use crate::config::{BlockFailurePolicy, ChecksumPolicy, InspectConfig};
use crate::error::InspectError;
use crate::kernels::checksum::ChecksumStatus;

//==================================================================================
// 1. Public Orchestration API
//==================================================================================

/// Decodes the body that follows an already-decoded header.
///
/// Reads exactly `header.data_length` bytes from `reader`, then runs the
/// directory, block and entry stages over the buffered body.
pub fn decode_chunk<R: Read>(
    reader: &mut R,
    header: &ChunkHeader,
    config: &InspectConfig,
) -> Result<DecodedChunk, InspectError> {
    let body = ChunkBody::load(reader, header.data_length, config)?;
    decode_loaded(body, config)
}

/// Decodes a body that is already in memory.
pub fn decode_body(bytes: Vec<u8>, config: &InspectConfig) -> Result<DecodedChunk, InspectError> {
    decode_loaded(ChunkBody::from_bytes(bytes)?, config)
}

//==================================================================================
// 2. Stage Coordination
//==================================================================================

fn decode_loaded(body: ChunkBody, config: &InspectConfig) -> Result<DecodedChunk, InspectError> {
    // 1. Directory. Any failure here is fatal for the file.
    let directory = decode_directory(&body)?;
    let mut warnings = Vec::new();

    // 2. Metadata checksum.
    if directory.checksum_status() == ChecksumStatus::Mismatch {
        let stored = directory.stored_checksum;
        let computed = directory.computed_checksum;
        if config.checksum_policy == ChecksumPolicy::Enforce {
            return Err(InspectError::ChecksumMismatch {
                region: "metadata".to_string(),
                stored,
                computed,
            });
        }
        log::warn!(
            "metadata checksum mismatch: stored {:08x}, computed {:08x}",
            stored,
            computed
        );
        warnings.push(DecodeWarning::MetadataChecksumMismatch { stored, computed });
    }

    // 3. Blocks, strictly in directory order.
    let mut blocks = Vec::with_capacity(directory.descriptors.len());
    for (ix, descriptor) in directory.descriptors.iter().enumerate() {
        let mut block = materialize_block(&body, ix, *descriptor, config);

        if config.block_failure_policy == BlockFailurePolicy::AbortChunk {
            if let Some(failure) = block.failure.take() {
                log::warn!("aborting chunk at block {}: {}", ix, failure);
                return Err(failure);
            }
        }

        collect_block_warnings(&block, config, &mut warnings);
        blocks.push(block);
    }

    let chunk = DecodedChunk {
        version: body.version(),
        codec: body.codec(),
        meta_offset: directory.meta_offset,
        metadata_checksum: directory.stored_checksum,
        computed_metadata_checksum: directory.computed_checksum,
        blocks,
        warnings,
        body: body.into_bytes(),
    };

    log::info!(
        "decoded {} chunk: {} blocks ({} failed), {} entries, {} warnings",
        chunk.codec,
        chunk.blocks.len(),
        chunk.failed_blocks().count(),
        chunk.total_entries(),
        chunk.warnings.len()
    );
    log_metric!(
        "event" = "chunk_decoded",
        "codec" = chunk.codec,
        "blocks" = chunk.blocks.len(),
        "entries" = chunk.total_entries(),
        "compressed_len" = chunk.compressed_len(),
        "decompressed_len" = chunk.decompressed_len()
    );

    Ok(chunk)
}

//==================================================================================
// 3. Per-Block Findings
//==================================================================================

fn collect_block_warnings(block: &Block, config: &InspectConfig, warnings: &mut Vec<DecodeWarning>) {
    // An enforced mismatch is the block's failure and is reported below.
    if config.checksum_policy == ChecksumPolicy::Report {
        if let (ChecksumStatus::Mismatch, Some(stored), Some(computed)) = (
            block.checksum_status(),
            block.stored_checksum,
            block.computed_checksum,
        ) {
            log::warn!(
                "block {} checksum mismatch: stored {:08x}, computed {:08x}",
                block.index,
                stored,
                computed
            );
            warnings.push(DecodeWarning::BlockChecksumMismatch {
                block: block.index,
                stored,
                computed,
            });
        }
    }

    if let Some(failure) = &block.failure {
        log::warn!("block {} isolated: {}", block.index, failure);
        warnings.push(DecodeWarning::BlockFailed {
            block: block.index,
            reason: failure.to_string(),
        });
        // A partial entry list says nothing about the descriptor.
        return;
    }

    if config.cross_check_descriptors {
        cross_check_descriptor(block, warnings);
    }
}

/// Compares a block's declared count and bounds with what was decoded.
fn cross_check_descriptor(block: &Block, warnings: &mut Vec<DecodeWarning>) {
    let d = &block.descriptor;

    if d.num_entries != block.entries.len() as u64 {
        warnings.push(DecodeWarning::EntryCountMismatch {
            block: block.index,
            declared: d.num_entries,
            decoded: block.entries.len(),
        });
    }

    if d.min_t > d.max_t {
        warnings.push(DecodeWarning::InvertedTimeBounds {
            block: block.index,
            min_t: d.min_t,
            max_t: d.max_t,
        });
        return;
    }

    // Only the first offender is reported per block.
    if let Some((entry, e)) = block
        .entries
        .iter()
        .enumerate()
        .find(|(_, e)| e.timestamp < d.min_t || e.timestamp > d.max_t)
    {
        warnings.push(DecodeWarning::EntryOutsideTimeBounds {
            block: block.index,
            entry,
            timestamp: e.timestamp,
            min_t: d.min_t,
            max_t: d.max_t,
        });
    }
}
