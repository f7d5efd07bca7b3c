//! This file is the root of the `chunkscope` Rust crate.
//!
//! `chunkscope` is a read-only decoder for log chunk files: a snappy-framed JSON
//! header followed by a body of independently compressed blocks, a metadata
//! directory and a CRC32C-protected trailer.
//!
//! Its responsibilities here are strictly limited to:
//! 1.  Declaring all the top-level modules of our library (`chunk_pipeline`,
//!     `kernels`, etc.) so the Rust compiler knows they exist.
//! 2.  Re-exporting the public surface used by reporting tools.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
//==================================================================================
// 1. Module Declarations
//==================================================================================
#[macro_use]
mod observability; // Make macros available throughout the crate

pub mod bridge;
pub mod chunk_pipeline;
pub mod codec;
pub mod config;
pub mod error;
pub mod kernels;
pub mod types;

//==================================================================================
// 2. Public Re-exports
//==================================================================================
pub use bridge::{analyze_chunk, decode_chunk_file, peek_header, ChunkFile, ChunkSummary};
pub use chunk_pipeline::block::{Block, PayloadSpan};
pub use chunk_pipeline::directory::BlockDescriptor;
pub use chunk_pipeline::entries::{Entry, EntryDecoder};
pub use chunk_pipeline::header::{ChunkHeader, Label};
pub use chunk_pipeline::model::{DecodeWarning, DecodedChunk};
pub use chunk_pipeline::orchestrator::{decode_body, decode_chunk};
pub use codec::{Codec, FormatVersion};
pub use config::{BlockFailurePolicy, ChecksumPolicy, InspectConfig, LoggingConfig};
pub use error::InspectError;
pub use kernels::checksum::{ChecksumStatus, Sha256Digest};
pub use observability::init_logging;
pub use types::ChunkTime;
