// In: src/bridge/stateless_api.rs

use std::io::Read;

use crate::bridge::format::{ChunkSummary, HEADER_LEN_FIELD};
use crate::chunk_pipeline;
use crate::chunk_pipeline::header::ChunkHeader;
use crate::chunk_pipeline::model::DecodedChunk;
use crate::config::InspectConfig;
use crate::error::InspectError;
use crate::kernels::checksum::ChecksumStatus;

/// A decoded chunk file: the series header and its decoded body.
#[derive(Debug)]
pub struct ChunkFile {
    pub header: ChunkHeader,
    pub chunk: DecodedChunk,
}

/// Decodes one whole chunk file from `reader`.
///
/// Bytes after the declared body are left unread.
pub fn decode_chunk_file<R: Read>(
    reader: &mut R,
    config: &InspectConfig,
) -> Result<ChunkFile, InspectError> {
    let header = chunk_pipeline::header::decode_header(reader, config)?;
    let chunk = chunk_pipeline::orchestrator::decode_chunk(reader, &header, config)?;
    Ok(ChunkFile { header, chunk })
}

/// Decodes only the header frame, leaving `reader` at the start of the body.
pub fn peek_header<R: Read>(
    reader: &mut R,
    config: &InspectConfig,
) -> Result<ChunkHeader, InspectError> {
    chunk_pipeline::header::decode_header(reader, config)
}

/// Computes the totals a report needs from a decoded file.
pub fn analyze_chunk(file: &ChunkFile) -> ChunkSummary {
    let chunk = &file.chunk;
    ChunkSummary {
        user_id: file.header.user_id.clone(),
        version: chunk.version,
        codec: chunk.codec,
        header_size: file.header.metadata_length as usize + HEADER_LEN_FIELD,
        body_size: chunk.body().len(),
        blocks: chunk.blocks.len(),
        failed_blocks: chunk.failed_blocks().count(),
        entries: chunk.total_entries(),
        compressed_size: chunk.compressed_len(),
        uncompressed_size: chunk.decompressed_len(),
        metadata_checksum: chunk.metadata_checksum_status(),
        bad_block_checksums: chunk
            .blocks
            .iter()
            .filter(|b| b.checksum_status() == ChecksumStatus::Mismatch)
            .count(),
        warnings: chunk.warnings.clone(),
    }
}
