// In: src/bridge/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Bridge Layer
// ====================================================================================
//
// The `bridge` is the public-facing API of the chunkscope library. It wraps the
// staged `chunk_pipeline` behind a handful of calls that take a byte stream and
// a config and return owned results.
//
// Data Flow:
//
//   1. [Stateless API (decode_chunk_file)]  -> Receives `impl Read`
//         |
//         `-> a. chunk_pipeline::header       -> ChunkHeader
//         |
//         `-> b. chunk_pipeline::orchestrator -> DecodedChunk
//
//   2. [Stateless API (analyze_chunk)]      -> Receives the decoded `ChunkFile`
//         |
//         `-> Returns a serializable `ChunkSummary` for the reporting layer
//
// ====================================================================================
pub mod format;
pub mod stateless_api;

// --- Low-Level Stateless API ---
pub use stateless_api::{analyze_chunk, decode_chunk_file, peek_header, ChunkFile};

// --- Format Constants and Structs ---
pub use format::{ChunkSummary, CHUNK_MAGIC};
