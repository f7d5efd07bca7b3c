//! Stage 5: the entry stream inside one decompressed block.
//!
//! An entry is `svarint timestamp, uvarint line length, line bytes`, repeated
//! until the buffer is exhausted. The descriptor's declared entry count plays no
//! part here; the buffer's extent is the only bound.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::borrow::Cow;
use std::io::Cursor;

use crate::error::InspectError;
use crate::kernels::{leb128, zigzag};
use crate::types::nanos_to_datetime;

/// One log line and its timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    /// Unix nanoseconds.
    pub timestamp: i64,
    /// The line exactly as stored. Not trimmed, not required to be UTF-8.
    pub line: Vec<u8>,
}

impl Entry {
    pub fn new(timestamp: i64, line: impl Into<Vec<u8>>) -> Self {
        Self {
            timestamp,
            line: line.into(),
        }
    }

    /// The line as text, replacing invalid UTF-8 sequences.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.line)
    }

    pub fn time(&self) -> DateTime<Utc> {
        nanos_to_datetime(self.timestamp)
    }
}

/// Iterates the entries of one decompressed block.
///
/// Yields `Err(TruncatedEntry)` at most once and then stops.
pub struct EntryDecoder<'a> {
    cursor: Cursor<&'a [u8]>,
    index: usize,
    done: bool,
}

impl<'a> EntryDecoder<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(bytes),
            index: 0,
            done: false,
        }
    }

    /// Number of entries successfully yielded so far.
    pub fn decoded(&self) -> usize {
        self.index
    }

    fn remaining(&self) -> usize {
        let buf = self.cursor.get_ref();
        buf.len().saturating_sub(self.cursor.position() as usize)
    }

    fn truncated(&self, reason: String) -> InspectError {
        InspectError::TruncatedEntry {
            entry: self.index,
            reason,
        }
    }

    fn decode_next(&mut self) -> Result<Entry, InspectError> {
        let timestamp = zigzag::decode_one(&mut self.cursor)
            .map_err(|e| self.truncated(format!("timestamp: {}", e)))?;
        let line_len = leb128::decode_one::<u64>(&mut self.cursor)
            .map_err(|e| self.truncated(format!("line length: {}", e)))?;

        let remaining = self.remaining();
        if line_len > remaining as u64 {
            return Err(self.truncated(format!(
                "line length {} exceeds the {} remaining bytes",
                line_len, remaining
            )));
        }

        let start = self.cursor.position() as usize;
        let end = start + line_len as usize;
        let line = self.cursor.get_ref()[start..end].to_vec();
        self.cursor.set_position(end as u64);

        Ok(Entry { timestamp, line })
    }
}

impl<'a> Iterator for EntryDecoder<'a> {
    type Item = Result<Entry, InspectError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.remaining() == 0 {
            return None;
        }
        match self.decode_next() {
            Ok(entry) => {
                self.index += 1;
                Some(Ok(entry))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Decodes a whole block, returning the entries read before any failure along
/// with that failure.
pub fn decode_entries(bytes: &[u8]) -> (Vec<Entry>, Option<InspectError>) {
    let mut entries = Vec::new();
    for item in EntryDecoder::new(bytes) {
        match item {
            Ok(entry) => entries.push(entry),
            Err(e) => return (entries, Some(e)),
        }
    }
    (entries, None)
}
