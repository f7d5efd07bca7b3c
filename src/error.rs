// In: src/error.rs

//! This module defines the single, unified error type for the entire chunkscope library.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.

use thiserror::Error;

use crate::codec::Codec;

#[derive(Error, Debug)]
pub enum InspectError {
    // =========================================================================
    // === Structural Errors (fatal for the whole file)
    // =========================================================================
    /// The stream or buffer ended before a field of known size was complete.
    #[error("Truncated {what}: expected {expected} bytes, got {got}")]
    Truncated {
        what: &'static str,
        expected: u64,
        got: u64,
    },

    #[error("Malformed header field '{field}': {reason}")]
    MalformedField { field: &'static str, reason: String },

    #[error("Invalid magic number: {0:#010x}")]
    BadMagic(u32),

    #[error("Unknown codec: format {format}, code {code}")]
    UnknownCodec { format: u8, code: u8 },

    #[error("Metadata directory decoding failed: {0}")]
    DirectoryDecodeError(String),

    // =========================================================================
    // === Block-Scoped Errors (isolated to one block by default)
    // =========================================================================
    #[error("Failed to initialise {codec} decompressor: {reason}")]
    CodecInitError { codec: Codec, reason: String },

    #[error("Block {block}: decompression failed: {reason}")]
    DecodeError { block: usize, reason: String },

    #[error("Block {block}: payload [{offset}, {end}) lies outside the {body_len}-byte body")]
    BlockOutOfBounds {
        block: usize,
        offset: u64,
        end: u64,
        body_len: usize,
    },

    #[error("Truncated entry #{entry}: {reason}")]
    TruncatedEntry { entry: usize, reason: String },

    #[error("Varint decoding error: {0}")]
    MalformedVarint(String),

    /// Only returned as an error under the enforcing checksum policy; otherwise
    /// mismatches are carried as warnings on the decoded chunk.
    #[error("Checksum mismatch in {region}: stored {stored:08x}, computed {computed:08x}")]
    ChecksumMismatch {
        region: String,
        stored: u32,
        computed: u32,
    },

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// An error originating from the underlying I/O subsystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error from the Serde JSON library, typically while loading configuration.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

impl InspectError {
    /// True for failures that can be confined to a single block.
    pub fn is_block_scoped(&self) -> bool {
        matches!(
            self,
            InspectError::CodecInitError { .. }
                | InspectError::DecodeError { .. }
                | InspectError::BlockOutOfBounds { .. }
                | InspectError::TruncatedEntry { .. }
                | InspectError::MalformedVarint(_)
                | InspectError::ChecksumMismatch { .. }
        )
    }
}
