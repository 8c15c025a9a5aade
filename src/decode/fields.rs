//! Per-field decoders
//!
//! Each function accepts a closed set of physical encodings for one kind of
//! logical field and rejects everything else. `None` means the key is absent
//! from the document.

use bson::Bson;
use chrono::{DateTime, TimeZone, Utc};

use super::error::DecodeReason;

/// Identifier: ObjectId (rendered as lowercase hex) or string (unchanged)
pub fn identifier(value: Option<&Bson>) -> Result<String, DecodeReason> {
    match value {
        Some(Bson::ObjectId(oid)) => Ok(oid.to_hex()),
        Some(Bson::String(s)) => Ok(s.clone()),
        Some(other) => Err(DecodeReason::unexpected("objectId or string", other)),
        None => Err(DecodeReason::Missing),
    }
}

/// Instant: BSON datetime, BSON timestamp, or RFC 3339 string
pub fn timestamp(value: Option<&Bson>) -> Result<DateTime<Utc>, DecodeReason> {
    match value {
        Some(Bson::DateTime(dt)) => Ok(dt.to_chrono()),
        Some(Bson::Timestamp(ts)) => Utc
            .timestamp_opt(i64::from(ts.time), 0)
            .single()
            .ok_or_else(|| DecodeReason::InvalidTimestamp {
                value: ts.time.to_string(),
                message: "out of range".to_string(),
            }),
        Some(Bson::String(s)) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| DecodeReason::InvalidTimestamp {
                value: s.clone(),
                message: e.to_string(),
            }),
        Some(other) => Err(DecodeReason::unexpected(
            "datetime, timestamp or RFC 3339 string",
            other,
        )),
        None => Err(DecodeReason::Missing),
    }
}

/// Required number: double, int32 or int64, widened to f64
pub fn number(value: Option<&Bson>) -> Result<f64, DecodeReason> {
    match value {
        Some(Bson::Double(v)) => Ok(*v),
        Some(Bson::Int32(v)) => Ok(f64::from(*v)),
        Some(Bson::Int64(v)) => Ok(*v as f64),
        Some(Bson::Null) | None => Err(DecodeReason::Missing),
        Some(other) => Err(DecodeReason::unexpected("double, int32 or int64", other)),
    }
}

/// Optional number: absent and `null` both mean "no value"
pub fn optional_number(value: Option<&Bson>) -> Result<Option<f64>, DecodeReason> {
    match value {
        Some(Bson::Null) | None => Ok(None),
        present => number(present).map(Some),
    }
}

pub fn string(value: Option<&Bson>) -> Result<String, DecodeReason> {
    match value {
        Some(Bson::String(s)) => Ok(s.clone()),
        Some(other) => Err(DecodeReason::unexpected("string", other)),
        None => Err(DecodeReason::Missing),
    }
}

pub fn int32(value: Option<&Bson>) -> Result<i32, DecodeReason> {
    match value {
        Some(Bson::Int32(v)) => Ok(*v),
        Some(other) => Err(DecodeReason::unexpected("int32", other)),
        None => Err(DecodeReason::Missing),
    }
}
