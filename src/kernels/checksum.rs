//! Integrity kernels: CRC32 (Castagnoli polynomial) for the stored checksums and
//! SHA-256 for the informational digests.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;

/// Computes the CRC32C of a byte slice.
pub fn crc32c(bytes: &[u8]) -> u32 {
    ::crc32c::crc32c(bytes)
}

/// Computes the SHA-256 of a byte slice.
pub fn sha256(bytes: &[u8]) -> Sha256Digest {
    Sha256Digest(Sha256::digest(bytes).into())
}

/// A SHA-256 fingerprint, displayed as lower-case hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Sha256Digest(pub [u8; 32]);

impl Sha256Digest {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sha256Digest({})", self)
    }
}

/// Outcome of comparing a stored checksum against the one computed on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecksumStatus {
    Verified,
    Mismatch,
    /// No stored checksum was read, because an earlier step failed.
    Absent,
}

impl ChecksumStatus {
    pub fn compare(stored: Option<u32>, computed: Option<u32>) -> Self {
        match (stored, computed) {
            (Some(s), Some(c)) if s == c => ChecksumStatus::Verified,
            (Some(_), Some(_)) => ChecksumStatus::Mismatch,
            _ => ChecksumStatus::Absent,
        }
    }
}
