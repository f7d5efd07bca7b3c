// In: src/config.rs

//! The single source of truth for all decoder configuration.
//!
//! This module defines the unified `InspectConfig` struct, which is designed to be
//! created once at the application boundary (e.g., from a JSON file handed to a
//! reporting tool) and then passed down by reference to every decode call.
//! Defaults reproduce a tolerant inspector: checksum mismatches are reported, not
//! fatal, and a corrupt block does not hide the rest of the chunk.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::InspectError;

//==================================================================================
// I. Policy Enums
//==================================================================================

/// What happens when one block fails to decompress or its entries fail to decode.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BlockFailurePolicy {
    /// **Default:** Record the failure on the block, keep any entries decoded before
    /// it, and continue with the next block.
    #[default]
    Isolate,

    /// Abort the whole chunk on the first block failure.
    AbortChunk,
}

/// How stored CRC32C values that do not match the computed ones are treated.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChecksumPolicy {
    /// **Default:** Keep both values and raise a warning.
    #[default]
    Report,

    /// Treat a mismatch as a `ChecksumMismatch` error. A metadata mismatch fails
    /// the file; a block mismatch fails the block (subject to `BlockFailurePolicy`).
    Enforce,
}

//==================================================================================
// II. Logging
//==================================================================================

/// Settings consumed by `observability::init_logging`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// A `log` level filter name: off, error, warn, info, debug or trace.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Append log output to this file instead of stderr.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

//==================================================================================
// III. The Unified InspectConfig
//==================================================================================

/// The single, unified configuration for decoding chunk files.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct InspectConfig {
    #[serde(default)]
    pub block_failure_policy: BlockFailurePolicy,

    #[serde(default)]
    pub checksum_policy: ChecksumPolicy,

    /// If true, compare each block's declared entry count and time bounds with
    /// the entries actually decoded, and raise warnings on divergence. The format
    /// itself never checks these.
    #[serde(default)]
    pub cross_check_descriptors: bool,

    /// Upper bound on the header frame's declared metadata length.
    #[serde(default = "default_max_header_len")]
    pub max_header_len: u32,

    /// Upper bound on the declared body length, checked before allocating it.
    #[serde(default = "default_max_body_len")]
    pub max_body_len: u32,

    /// Upper bound on a single block's decompressed size.
    #[serde(default = "default_max_block_decompressed_len")]
    pub max_block_decompressed_len: usize,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            block_failure_policy: BlockFailurePolicy::default(),
            checksum_policy: ChecksumPolicy::default(),
            cross_check_descriptors: false,
            max_header_len: default_max_header_len(),
            max_body_len: default_max_body_len(),
            max_block_decompressed_len: default_max_block_decompressed_len(),
            logging: LoggingConfig::default(),
        }
    }
}

impl InspectConfig {
    /// Parses a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, InspectError> {
        Ok(serde_json::from_str(text)?)
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// 16 MiB.
fn default_max_header_len() -> u32 {
    16 * 1024 * 1024
}

/// 1 GiB.
fn default_max_body_len() -> u32 {
    1024 * 1024 * 1024
}

/// 256 MiB.
fn default_max_block_decompressed_len() -> usize {
    256 * 1024 * 1024
}
