// In: src/chunk_pipeline/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Decode Pipeline
// ====================================================================================
//
// A chunk file is decoded in six strictly ordered stages. Every stage consumes the
// output of the one before it; nothing is decoded speculatively.
//
//   1. [header]       stream -> ChunkHeader (reader left at body start)
//   2. [body]         stream -> ChunkBody (whole body buffered, magic + codec checked)
//   3. [directory]    ChunkBody -> MetadataDirectory (trailer, CRC, descriptors)
//   4. [block]        descriptor -> Block (slice, CRC, digests, decompress)
//   5. [entries]      decompressed bytes -> Entry stream
//   6. [orchestrator] runs 3..5 per body and applies the configured policies
//
// Failure scope:
//
//   - Stages 1..3 are structural. Any error aborts the file.
//   - Stages 4..5 are block-scoped. Under `BlockFailurePolicy::Isolate` the error
//     is recorded on the block and decoding moves on to the next descriptor.
//   - Checksum mismatches are warnings unless `ChecksumPolicy::Enforce` is set.
//
// ====================================================================================
pub mod block;
pub mod body;
pub mod directory;
pub mod entries;
pub mod header;
pub mod model;
pub mod orchestrator;

#[cfg(test)]
pub(crate) mod fixtures;
