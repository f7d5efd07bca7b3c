//! This module contains the pure, stateless kernels for Zig-zag encoding and
//! decoding of 64-bit signed integers.
//!
//! Signed varints (block time bounds, entry timestamps) are stored as the zig-zag
//! mapping of the value followed by LEB128, so small negative and positive values
//! both stay short on disk.

use std::io::Cursor;

use crate::error::InspectError;
use crate::kernels::leb128;

/// Encodes a single signed integer using the Zig-zag algorithm.
pub fn encode_val(n: i64) -> u64 {
    // The right shift is arithmetic, producing all ones for negative values.
    ((n << 1) ^ (n >> 63)) as u64
}

/// Decodes a single unsigned integer back to its signed representation.
pub fn decode_val(n: u64) -> i64 {
    ((n >> 1) as i64) ^ -((n & 1) as i64)
}

/// Decodes one signed varint (zig-zag + LEB128) from the cursor, advancing it.
pub fn decode_one(cursor: &mut Cursor<&[u8]>) -> Result<i64, InspectError> {
    leb128::decode_one::<u64>(cursor).map(decode_val)
}

/// Appends one signed varint to the buffer.
pub fn encode_one(value: i64, buffer: &mut Vec<u8>) -> Result<(), InspectError> {
    leb128::encode_one(encode_val(value), buffer)
}
