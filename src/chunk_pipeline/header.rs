//! Stage 1: the header frame.
//!
//! The frame is `u32 metadataLength` (counting its own four bytes), a
//! snappy-framed JSON object describing the series, then `u32 dataLength`. All
//! integers are big-endian. After `decode_header` returns, the reader sits on
//! the first byte of the body.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;

use crate::bridge::format::HEADER_LEN_FIELD;
use crate::config::InspectConfig;
use crate::error::InspectError;
use crate::kernels;
use crate::types::ChunkTime;

//==================================================================================
// Public Structs
//==================================================================================

/// One label of the series identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Label {
    pub name: String,
    pub value: String,
}

/// Series metadata and body sizing decoded from the header frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkHeader {
    /// Series fingerprint; zero when the writer omitted it.
    pub fingerprint: u64,
    pub user_id: String,
    pub from: ChunkTime,
    pub through: ChunkTime,
    /// Unique label pairs, sorted by name.
    pub labels: Vec<Label>,
    pub encoding: u8,
    pub metadata_length: u32,
    pub data_length: u32,
}

impl ChunkHeader {
    /// Looks up a label value by name.
    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels
            .binary_search_by(|l| l.name.as_str().cmp(name))
            .ok()
            .map(|ix| self.labels[ix].value.as_str())
    }
}

/// The JSON object inside the header frame.
#[derive(Deserialize)]
struct HeaderMetadata {
    #[serde(default)]
    fingerprint: u64,
    #[serde(rename = "userID", default)]
    user_id: String,
    from: ChunkTime,
    through: ChunkTime,
    #[serde(default)]
    metric: BTreeMap<String, String>,
    #[serde(default)]
    encoding: u8,
}

//==================================================================================
// Core Implementation
//==================================================================================

/// Decodes the header frame from the front of `reader`.
pub fn decode_header<R: Read>(
    reader: &mut R,
    config: &InspectConfig,
) -> Result<ChunkHeader, InspectError> {
    let metadata_length = read_u32_be(reader, "header metadata length")?;
    if (metadata_length as usize) < HEADER_LEN_FIELD {
        return Err(InspectError::MalformedField {
            field: "metadata_length",
            reason: format!(
                "{} is smaller than its own {}-byte field",
                metadata_length, HEADER_LEN_FIELD
            ),
        });
    }
    if metadata_length > config.max_header_len {
        return Err(InspectError::MalformedField {
            field: "metadata_length",
            reason: format!(
                "{} exceeds the maximum allowed header size ({})",
                metadata_length, config.max_header_len
            ),
        });
    }

    let compressed = read_exactly(
        reader,
        metadata_length as usize - HEADER_LEN_FIELD,
        "header metadata",
    )?;
    let metadata = parse_metadata(&compressed)?;

    let data_length = read_u32_be(reader, "body length")?;

    if metadata.from > metadata.through {
        return Err(InspectError::MalformedField {
            field: "through",
            reason: format!("through ({}) precedes from ({})", metadata.through, metadata.from),
        });
    }

    // Object keys are unique and the map iterates in name order.
    let labels: Vec<Label> = metadata
        .metric
        .into_iter()
        .map(|(name, value)| Label { name, value })
        .collect();

    log::debug!(
        "decoded chunk header: user={} labels={} data_length={}",
        metadata.user_id,
        labels.len(),
        data_length
    );

    Ok(ChunkHeader {
        fingerprint: metadata.fingerprint,
        user_id: metadata.user_id,
        from: metadata.from,
        through: metadata.through,
        labels,
        encoding: metadata.encoding,
        metadata_length,
        data_length,
    })
}

/// Decodes the first JSON value of the snappy stream; anything after it is ignored.
fn parse_metadata(compressed: &[u8]) -> Result<HeaderMetadata, InspectError> {
    let stream = kernels::snappy::decoder(compressed);
    let mut values = serde_json::Deserializer::from_reader(stream).into_iter::<HeaderMetadata>();
    match values.next() {
        Some(Ok(metadata)) => Ok(metadata),
        Some(Err(e)) => Err(InspectError::MalformedField {
            field: "metadata",
            reason: e.to_string(),
        }),
        None => Err(InspectError::MalformedField {
            field: "metadata",
            reason: "no JSON object in header frame".to_string(),
        }),
    }
}

//==================================================================================
// Stream Helpers
//==================================================================================

/// Reads exactly `len` bytes, reporting how many were available on a short read.
pub(crate) fn read_exactly<R: Read>(
    reader: &mut R,
    len: usize,
    what: &'static str,
) -> Result<Vec<u8>, InspectError> {
    let mut buf = Vec::new();
    reader.take(len as u64).read_to_end(&mut buf)?;
    if buf.len() < len {
        return Err(InspectError::Truncated {
            what,
            expected: len as u64,
            got: buf.len() as u64,
        });
    }
    Ok(buf)
}

fn read_u32_be<R: Read>(reader: &mut R, what: &'static str) -> Result<u32, InspectError> {
    let bytes = read_exactly(reader, 4, what)?;
    Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

//==================================================================================
// Unit Tests
//==================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk_pipeline::fixtures::{encode_header, encode_header_json};
    use std::io::Cursor;

    const HEADER_JSON: &str = r#"{
        "fingerprint": 17406532219245592034,
        "userID": "fake",
        "from": 1588867200.123,
        "through": 1588870800,
        "metric": {"job": "varlogs", "__name__": "logs", "filename": "/var/log/syslog"},
        "encoding": 129
    }"#;

    #[test]
    fn test_decodes_all_fields_and_stops_at_body() {
        let mut bytes = encode_header_json(HEADER_JSON, 3);
        bytes.extend_from_slice(b"BODY");
        let mut cursor = Cursor::new(bytes);

        let header = decode_header(&mut cursor, &InspectConfig::default()).unwrap();

        assert_eq!(header.fingerprint, 17406532219245592034);
        assert_eq!(header.user_id, "fake");
        assert_eq!(header.from.as_millis(), 1_588_867_200_123);
        assert_eq!(header.through.as_millis(), 1_588_870_800_000);
        assert_eq!(header.encoding, 129);
        assert_eq!(header.data_length, 3);
        let names: Vec<_> = header.labels.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["__name__", "filename", "job"]);
        assert_eq!(header.label("job"), Some("varlogs"));
        assert_eq!(header.label("missing"), None);

        let mut rest = Vec::new();
        cursor.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, b"BODY");
    }

    #[test]
    fn test_metadata_length_includes_its_own_field() {
        let bytes = encode_header("u", &[("a", "b")], 1000, 2000, 10);
        let header = decode_header(&mut bytes.as_slice(), &InspectConfig::default()).unwrap();
        // Whole frame = metadata_length + the trailing data length field.
        assert_eq!(header.metadata_length as usize + 4, bytes.len());
    }

    #[test]
    fn test_truncated_stream() {
        let bytes = encode_header("u", &[], 0, 0, 0);

        let result = decode_header(&mut &bytes[..2], &InspectConfig::default());
        assert!(matches!(
            result,
            Err(InspectError::Truncated { expected: 4, got: 2, .. })
        ));

        let cut = bytes.len() - 6;
        let result = decode_header(&mut &bytes[..cut], &InspectConfig::default());
        assert!(matches!(result, Err(InspectError::Truncated { .. })));
    }

    #[test]
    fn test_malformed_fields() {
        // Length field smaller than itself.
        let result = decode_header(&mut &[0u8, 0, 0, 2][..], &InspectConfig::default());
        assert!(matches!(
            result,
            Err(InspectError::MalformedField { field: "metadata_length", .. })
        ));

        // Not snappy framed.
        let mut raw = Vec::new();
        raw.extend_from_slice(&(4u32 + 2).to_be_bytes());
        raw.extend_from_slice(b"{}");
        raw.extend_from_slice(&0u32.to_be_bytes());
        let result = decode_header(&mut raw.as_slice(), &InspectConfig::default());
        assert!(matches!(
            result,
            Err(InspectError::MalformedField { field: "metadata", .. })
        ));

        // Missing required time bounds.
        let bytes = encode_header_json(r#"{"userID": "x"}"#, 0);
        let result = decode_header(&mut bytes.as_slice(), &InspectConfig::default());
        assert!(matches!(
            result,
            Err(InspectError::MalformedField { field: "metadata", .. })
        ));

        // Inverted bounds.
        let bytes = encode_header("u", &[], 5000, 1000, 0);
        let result = decode_header(&mut bytes.as_slice(), &InspectConfig::default());
        assert!(matches!(
            result,
            Err(InspectError::MalformedField { field: "through", .. })
        ));
    }

    #[test]
    fn test_oversized_header_is_rejected_before_reading() {
        let config = InspectConfig {
            max_header_len: 64,
            ..InspectConfig::default()
        };
        let result = decode_header(&mut &[0u8, 0, 1, 0][..], &config);
        assert!(matches!(
            result,
            Err(InspectError::MalformedField { field: "metadata_length", .. })
        ));
    }
}
