//! This module contains the pure, stateless kernels for LEB128 (Little-Endian
//! Base 128) variable-length integer encoding and decoding.
//!
//! Every length, offset and count in the metadata directory and the entry stream
//! is stored this way. The decoder follows the usual Go `binary.Uvarint` rules: a
//! `u64` takes at most ten bytes and the tenth byte may only carry a single bit.
//! It is fully panic-free.

use num_traits::{PrimInt, Unsigned};
use std::io::Cursor;

use crate::error::InspectError;

//==================================================================================
// 1. Public API for Single-Value Operations
//==================================================================================

/// Encodes a single unsigned integer into a LEB128 byte sequence, writing to a buffer.
pub fn encode_one<T>(value: T, buffer: &mut Vec<u8>) -> Result<(), InspectError>
where
    T: PrimInt + Unsigned,
{
    let zero = T::zero();
    let seven_bit_mask = T::from(0x7F)
        .ok_or_else(|| InspectError::MalformedVarint("7-bit mask does not fit type".to_string()))?;

    let mut current_value = value;
    loop {
        let low_bits = (current_value & seven_bit_mask)
            .to_u8()
            .ok_or_else(|| InspectError::MalformedVarint("Failed to narrow to u8".to_string()))?;
        current_value = current_value >> 7;

        if current_value == zero {
            buffer.push(low_bits);
            return Ok(());
        }
        buffer.push(low_bits | 0x80);
    }
}

/// Decodes a single unsigned integer from a LEB128 byte stream cursor, advancing it.
pub fn decode_one<T>(cursor: &mut Cursor<&[u8]>) -> Result<T, InspectError>
where
    T: PrimInt + Unsigned,
{
    let mut result = T::zero();
    let mut shift = 0;
    let total_bits = std::mem::size_of::<T>() * 8;

    loop {
        let pos = cursor.position() as usize;
        let byte = *cursor.get_ref().get(pos).ok_or_else(|| {
            InspectError::MalformedVarint("Unexpected end of buffer".to_string())
        })?;
        cursor.set_position((pos + 1) as u64);

        // Check if adding these 7 bits would overflow the type's capacity.
        if shift >= total_bits {
            return Err(InspectError::MalformedVarint(
                "Integer overflow during decoding".to_string(),
            ));
        }

        let seven_bit_payload = T::from(byte & 0x7F).ok_or_else(|| {
            InspectError::MalformedVarint("Failed to widen 7-bit payload".to_string())
        })?;
        result = result | (seven_bit_payload << shift);

        if byte & 0x80 == 0 {
            // The last byte may not set bits beyond the width of the type.
            if shift + 7 > total_bits && (byte >> (total_bits - shift)) > 0 {
                return Err(InspectError::MalformedVarint(
                    "Integer overflow during decoding".to_string(),
                ));
            }
            return Ok(result);
        }

        shift += 7;
    }
}

//==================================================================================
// 2. Unit Tests
//==================================================================================
#[cfg(test)]
mod tests {
    use super::*;

    /// One `u64` from the front of `bytes`, with the number of bytes it occupied.
    fn decode_u64(bytes: &[u8]) -> Result<(u64, usize), InspectError> {
        let mut cursor = Cursor::new(bytes);
        let value = decode_one::<u64>(&mut cursor)?;
        Ok((value, cursor.position() as usize))
    }

    #[test]
    fn test_known_encodings() {
        let mut buf = Vec::new();
        encode_one(624485u64, &mut buf).unwrap();
        assert_eq!(buf, vec![0xE5, 0x8E, 0x26]);

        buf.clear();
        encode_one(0u64, &mut buf).unwrap();
        assert_eq!(buf, vec![0x00]);

        buf.clear();
        encode_one(u64::MAX, &mut buf).unwrap();
        assert_eq!(buf.len(), 10);
        assert_eq!(buf[9], 0x01);
        assert_eq!(decode_u64(&buf).unwrap(), (u64::MAX, 10));
    }

    #[test]
    fn test_decode_advances_cursor_past_each_value() {
        let mut buf = Vec::new();
        for v in [1u64, 300, 70_000] {
            encode_one(v, &mut buf).unwrap();
        }
        let mut cursor = Cursor::new(buf.as_slice());
        assert_eq!(decode_one::<u64>(&mut cursor).unwrap(), 1);
        assert_eq!(decode_one::<u64>(&mut cursor).unwrap(), 300);
        assert_eq!(decode_one::<u64>(&mut cursor).unwrap(), 70_000);
        assert_eq!(cursor.position() as usize, buf.len());
    }

    #[test]
    fn test_decode_truncated_buffer() {
        // 624485 encodes to [0xE5, 0x8E, 0x26]; drop the final byte.
        let result = decode_u64(&[0xE5, 0x8E]);
        match result {
            Err(InspectError::MalformedVarint(msg)) => assert!(msg.contains("end of buffer")),
            other => panic!("expected MalformedVarint, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_overflow_error() {
        // Tenth byte carries more than the single remaining bit of a u64.
        let encoded_bytes = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x02];
        match decode_u64(&encoded_bytes) {
            Err(InspectError::MalformedVarint(msg)) => assert!(msg.contains("overflow")),
            other => panic!("expected overflow, got {:?}", other),
        }

        // Eleven bytes can never be a u64.
        let too_long = [0x80u8; 10]
            .iter()
            .copied()
            .chain(std::iter::once(0x00))
            .collect::<Vec<_>>();
        assert!(decode_u64(&too_long).is_err());
    }
}
