//! Test-only chunk writer.
//!
//! Produces bit-exact header frames and bodies so the decoder can be exercised
//! end to end. Compiled only under `cfg(test)`.

use serde_json::json;
use std::collections::BTreeMap;

use crate::bridge::format::CHUNK_MAGIC;
use crate::codec::{Codec, FormatVersion};
use crate::kernels::{checksum, leb128, snappy, zigzag};
use crate::types::ChunkTime;

/// The entries of one block to be written.
#[derive(Debug, Clone)]
pub struct FixtureBlock {
    pub entries: Vec<(i64, String)>,
}

impl FixtureBlock {
    pub fn new(entries: &[(i64, &str)]) -> Self {
        Self {
            entries: entries.iter().map(|(ts, l)| (*ts, l.to_string())).collect(),
        }
    }

    fn min_t(&self) -> i64 {
        self.entries.iter().map(|(ts, _)| *ts).min().unwrap_or(0)
    }

    fn max_t(&self) -> i64 {
        self.entries.iter().map(|(ts, _)| *ts).max().unwrap_or(0)
    }

    pub fn plaintext(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for (ts, line) in &self.entries {
            push_entry(&mut out, *ts, line.as_bytes());
        }
        out
    }
}

fn push_entry(out: &mut Vec<u8>, timestamp: i64, line: &[u8]) {
    zigzag::encode_one(timestamp, out).unwrap();
    leb128::encode_one(line.len() as u64, out).unwrap();
    out.extend_from_slice(line);
}

/// Encodes `(timestamp, line)` pairs as one block's decompressed bytes.
pub fn encode_entries(entries: &[(i64, &str)]) -> Vec<u8> {
    let mut out = Vec::new();
    for (ts, line) in entries {
        push_entry(&mut out, *ts, line.as_bytes());
    }
    out
}

struct RawDescriptor {
    num_entries: u64,
    min_t: i64,
    max_t: i64,
    offset: u64,
    length: u64,
}

fn preamble(version: FormatVersion, codec: Codec) -> Vec<u8> {
    let mut out = CHUNK_MAGIC.to_be_bytes().to_vec();
    out.push(version.as_byte());
    out.push(codec.code());
    out
}

fn push_payload(out: &mut Vec<u8>, payload: &[u8]) -> (u64, u64) {
    let offset = out.len() as u64;
    out.extend_from_slice(payload);
    out.extend_from_slice(&checksum::crc32c(payload).to_be_bytes());
    (offset, payload.len() as u64)
}

fn push_trailer(out: &mut Vec<u8>, descriptors: &[RawDescriptor]) {
    let meta_offset = out.len() as u64;
    let mut region = Vec::new();
    leb128::encode_one(descriptors.len() as u64, &mut region).unwrap();
    for d in descriptors {
        leb128::encode_one(d.num_entries, &mut region).unwrap();
        zigzag::encode_one(d.min_t, &mut region).unwrap();
        zigzag::encode_one(d.max_t, &mut region).unwrap();
        leb128::encode_one(d.offset, &mut region).unwrap();
        leb128::encode_one(d.length, &mut region).unwrap();
    }
    out.extend_from_slice(&region);
    out.extend_from_slice(&checksum::crc32c(&region).to_be_bytes());
    out.extend_from_slice(&meta_offset.to_be_bytes());
}

/// Writes a complete body: preamble, compressed payloads, directory, trailer.
pub fn encode_body(version: FormatVersion, codec: Codec, blocks: &[FixtureBlock]) -> Vec<u8> {
    let mut out = preamble(version, codec);
    let mut descriptors = Vec::with_capacity(blocks.len());
    for block in blocks {
        let payload = codec.compress(&block.plaintext());
        let (offset, length) = push_payload(&mut out, &payload);
        descriptors.push(RawDescriptor {
            num_entries: block.entries.len() as u64,
            min_t: block.min_t(),
            max_t: block.max_t(),
            offset,
            length,
        });
    }
    push_trailer(&mut out, &descriptors);
    out
}

/// Writes an uncompressed body whose payloads are taken verbatim.
/// Descriptors declare zero entries and zero bounds.
pub fn encode_raw_body(payloads: &[Vec<u8>]) -> Vec<u8> {
    encode_raw_body_as(FormatVersion::Coded, Codec::None, payloads)
}

/// Like `encode_raw_body`, but labels the verbatim payloads with any format and
/// codec, so a test can hand a decoder bytes it will reject.
pub fn encode_raw_body_as(version: FormatVersion, codec: Codec, payloads: &[Vec<u8>]) -> Vec<u8> {
    let mut out = preamble(version, codec);
    let descriptors: Vec<RawDescriptor> = payloads
        .iter()
        .map(|p| {
            let (offset, length) = push_payload(&mut out, p);
            RawDescriptor {
                num_entries: 0,
                min_t: 0,
                max_t: 0,
                offset,
                length,
            }
        })
        .collect();
    push_trailer(&mut out, &descriptors);
    out
}

/// Frames an arbitrary JSON document as a header.
pub fn encode_header_json(json: &str, data_length: u32) -> Vec<u8> {
    let compressed = snappy::encode(json.as_bytes());
    let mut out = ((compressed.len() + 4) as u32).to_be_bytes().to_vec();
    out.extend_from_slice(&compressed);
    out.extend_from_slice(&data_length.to_be_bytes());
    out
}

/// Frames a header with the usual fields. Times are written in their string form.
pub fn encode_header(
    user: &str,
    labels: &[(&str, &str)],
    from_ms: i64,
    through_ms: i64,
    data_length: u32,
) -> Vec<u8> {
    let metric: BTreeMap<&str, &str> = labels.iter().copied().collect();
    let doc = json!({
        "fingerprint": 42u64,
        "userID": user,
        "from": ChunkTime::from_millis(from_ms).to_string(),
        "through": ChunkTime::from_millis(through_ms).to_string(),
        "metric": metric,
        "encoding": 129,
    });
    encode_header_json(&doc.to_string(), data_length)
}

/// Header frame followed by its body.
pub fn encode_chunk_file(
    user: &str,
    labels: &[(&str, &str)],
    version: FormatVersion,
    codec: Codec,
    blocks: &[FixtureBlock],
) -> Vec<u8> {
    let body = encode_body(version, codec, blocks);
    let from = blocks.iter().map(|b| b.min_t()).min().unwrap_or(0) / 1_000_000;
    let through = blocks.iter().map(|b| b.max_t()).max().unwrap_or(0) / 1_000_000;
    let mut out = encode_header(user, labels, from, through, body.len() as u32);
    out.extend_from_slice(&body);
    out
}
