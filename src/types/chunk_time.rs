//! The compact timestamp stored in chunk headers: milliseconds since the Unix
//! epoch, serialised in JSON as decimal seconds with at most millisecond
//! precision (e.g. `1588867200.123`).

use chrono::{DateTime, TimeZone, Utc};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

const MILLIS_PER_SECOND: i64 = 1000;
const DOT_PRECISION: usize = 3;

/// Milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ChunkTime(i64);

impl ChunkTime {
    pub const fn from_millis(millis: i64) -> Self {
        ChunkTime(millis)
    }

    pub const fn as_millis(self) -> i64 {
        self.0
    }

    /// Converts to a UTC instant, or `None` when out of chrono's range.
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.0).single()
    }

    /// Parses the decimal-seconds text form, truncating below millisecond precision.
    pub fn parse_decimal(text: &str) -> Result<Self, String> {
        let text = text.trim();
        let negative = text.starts_with('-');
        let (secs_part, frac_part) = match text.split_once('.') {
            Some((s, f)) => (s, Some(f)),
            None => (text, None),
        };

        let secs: i64 = if secs_part.is_empty() || secs_part == "-" {
            0
        } else {
            secs_part
                .parse()
                .map_err(|e| format!("invalid seconds '{}': {}", secs_part, e))?
        };
        let whole = secs
            .checked_mul(MILLIS_PER_SECOND)
            .ok_or_else(|| format!("timestamp '{}' overflows", text))?;

        let Some(frac) = frac_part else {
            return Ok(ChunkTime(whole));
        };
        if !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format!("invalid fraction '{}'", frac));
        }
        let mut digits: String = frac.chars().take(DOT_PRECISION).collect();
        while digits.len() < DOT_PRECISION {
            digits.push('0');
        }
        let millis: i64 = digits
            .parse()
            .map_err(|e| format!("invalid fraction '{}': {}", frac, e))?;

        let total = if negative {
            whole.checked_sub(millis)
        } else {
            whole.checked_add(millis)
        };
        total
            .map(ChunkTime)
            .ok_or_else(|| format!("timestamp '{}' overflows", text))
    }
}

/// Converts a nanosecond epoch timestamp (block bounds, entries) to a UTC instant.
pub fn nanos_to_datetime(nanos: i64) -> DateTime<Utc> {
    Utc.timestamp_nanos(nanos)
}

impl fmt::Display for ChunkTime {
    /// Decimal seconds with trailing zeros trimmed, matching the JSON form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let secs = abs / MILLIS_PER_SECOND as u64;
        let frac = abs % MILLIS_PER_SECOND as u64;
        if frac == 0 {
            write!(f, "{}{}", sign, secs)
        } else {
            let digits = format!("{:03}", frac);
            write!(f, "{}{}.{}", sign, secs, digits.trim_end_matches('0'))
        }
    }
}

impl Serialize for ChunkTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.0)
    }
}

impl<'de> Deserialize<'de> for ChunkTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ChunkTimeVisitor)
    }
}

struct ChunkTimeVisitor;

impl<'de> Visitor<'de> for ChunkTimeVisitor {
    type Value = ChunkTime;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("decimal seconds as a JSON number or string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<ChunkTime, E> {
        v.checked_mul(MILLIS_PER_SECOND)
            .map(ChunkTime)
            .ok_or_else(|| E::custom(format!("timestamp {} overflows", v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<ChunkTime, E> {
        let v = i64::try_from(v).map_err(|_| E::custom(format!("timestamp {} overflows", v)))?;
        self.visit_i64(v)
    }

    // The shortest round-trip form of `v` is the decimal the writer emitted, so
    // numbers truncate exactly like strings do.
    fn visit_f64<E: de::Error>(self, v: f64) -> Result<ChunkTime, E> {
        if !v.is_finite() {
            return Err(E::custom(format!("timestamp {} out of range", v)));
        }
        ChunkTime::parse_decimal(&v.to_string()).map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<ChunkTime, E> {
        ChunkTime::parse_decimal(v).map_err(E::custom)
    }
}
