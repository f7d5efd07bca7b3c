//! This module collects the pure, stateless kernels the decoder is built from.
//!
//! Integer kernels (`leb128`, `zigzag`) decode the variable-length fields of the
//! metadata directory and the entry stream. Integrity kernels (`checksum`) compute
//! CRC32C and SHA-256 values. The remaining modules each wrap one decompression
//! family and expose a single `decoder` constructor; the `codec` registry picks
//! between them.

//==================================================================================
// 1. Module Declarations
//==================================================================================

/// Variable-length integers
pub mod leb128;
pub mod zigzag;

/// Integrity
pub mod checksum;

/// Decompression families
pub mod deflate;
pub mod lz4;
pub mod snappy;
pub mod zstd;
