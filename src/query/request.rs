//! Request model
//!
//! A validated measurement query: which sensor, and optionally which time
//! window. Construction is the only place a request is checked.

use bson::{doc, oid::ObjectId, Bson};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How sensor identifiers are stored
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdScheme {
    /// 12-byte ObjectIds, given as 24 hex digits
    #[default]
    ObjectId,
    /// Free-form strings
    Opaque,
    /// 24 hex digits stored either as ObjectId or as string; matches both
    Either,
}

/// Request parameters were missing or malformed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("sensorId is required")]
    EmptySensorId,

    #[error("document id is required")]
    EmptyDocumentId,

    #[error("invalid {field}: '{value}' is not a 24-digit hex ObjectId")]
    InvalidObjectId { field: &'static str, value: String },

    #[error("invalid {field}: {message}")]
    InvalidParameter { field: &'static str, message: String },
}

/// A sensor identifier in the encoding the store uses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SensorRef {
    ObjectId(ObjectId),
    Opaque(String),
    /// Matched in both encodings
    Either(ObjectId),
}

impl SensorRef {
    /// Parse `raw` under `scheme`
    pub fn parse(raw: &str, scheme: IdScheme) -> Result<Self, ValidationError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ValidationError::EmptySensorId);
        }

        let object_id = || {
            ObjectId::parse_str(raw).map_err(|_| ValidationError::InvalidObjectId {
                field: "sensorId",
                value: raw.to_string(),
            })
        };

        match scheme {
            IdScheme::ObjectId => object_id().map(SensorRef::ObjectId),
            IdScheme::Opaque => Ok(SensorRef::Opaque(raw.to_string())),
            IdScheme::Either => object_id().map(SensorRef::Either),
        }
    }

    /// Condition on the stored `sId`: a literal, or `$in` over both encodings
    pub fn predicate(&self) -> Bson {
        match self {
            SensorRef::ObjectId(oid) => Bson::ObjectId(*oid),
            SensorRef::Opaque(s) => Bson::String(s.clone()),
            SensorRef::Either(oid) => Bson::Document(doc! {
                "$in": [Bson::ObjectId(*oid), Bson::String(oid.to_hex())]
            }),
        }
    }
}

impl std::fmt::Display for SensorRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SensorRef::ObjectId(oid) | SensorRef::Either(oid) => write!(f, "{}", oid.to_hex()),
            SensorRef::Opaque(s) => write!(f, "{}", s),
        }
    }
}

/// Measurements of one sensor, optionally within `[from, to]`
///
/// `from <= to` is not checked here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorQueryRequest {
    sensor: SensorRef,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
}

impl SensorQueryRequest {
    /// Create an unbounded request for `sensor_id`
    pub fn new(sensor_id: &str, scheme: IdScheme) -> Result<Self, ValidationError> {
        Ok(Self {
            sensor: SensorRef::parse(sensor_id, scheme)?,
            from: None,
            to: None,
        })
    }

    /// Builder: set the inclusive lower bound
    pub fn with_from(mut self, from: DateTime<Utc>) -> Self {
        self.from = Some(from);
        self
    }

    /// Builder: set the inclusive upper bound
    pub fn with_to(mut self, to: DateTime<Utc>) -> Self {
        self.to = Some(to);
        self
    }

    /// Builder: set both bounds, either of which may be absent
    pub fn with_bounds(mut self, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    pub fn sensor(&self) -> &SensorRef {
        &self.sensor
    }

    pub fn from(&self) -> Option<DateTime<Utc>> {
        self.from
    }

    pub fn to(&self) -> Option<DateTime<Utc>> {
        self.to
    }
}

/// Parse an optional RFC 3339 instant from a request parameter
///
/// Absent and blank values both mean "unbounded".
pub fn parse_instant(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<DateTime<Utc>>, ValidationError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|e| ValidationError::InvalidParameter {
                field,
                message: format!("'{}' is not an RFC 3339 instant ({})", s, e),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_object_id_request() {
        let request = SensorQueryRequest::new("67b3039d85c10e3ee466eccd", IdScheme::ObjectId).unwrap();

        assert_eq!(request.sensor().to_string(), "67b3039d85c10e3ee466eccd");
        assert!(matches!(request.sensor().predicate(), Bson::ObjectId(_)));
        assert_eq!(request.from(), None);
        assert_eq!(request.to(), None);
    }

    #[test]
    fn test_object_id_is_normalized_to_lowercase() {
        let request = SensorQueryRequest::new(" 67B3039D85C10E3EE466ECCD ", IdScheme::ObjectId).unwrap();
        assert_eq!(request.sensor().to_string(), "67b3039d85c10e3ee466eccd");
    }

    #[test]
    fn test_empty_sensor_id() {
        assert_eq!(
            SensorQueryRequest::new("", IdScheme::ObjectId),
            Err(ValidationError::EmptySensorId)
        );
        assert_eq!(
            SensorQueryRequest::new("   ", IdScheme::Opaque),
            Err(ValidationError::EmptySensorId)
        );
    }

    #[test]
    fn test_malformed_object_id() {
        let err = SensorQueryRequest::new("not-hex", IdScheme::ObjectId).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidObjectId { .. }));

        let request = SensorQueryRequest::new("not-hex", IdScheme::Opaque).unwrap();
        assert_eq!(request.sensor().predicate(), Bson::String("not-hex".to_string()));
    }

    #[test]
    fn test_either_scheme() {
        let request =
            SensorQueryRequest::new("67B3039D85C10E3EE466ECCD", IdScheme::Either).unwrap();
        let oid = ObjectId::parse_str("67b3039d85c10e3ee466eccd").unwrap();

        assert_eq!(
            request.sensor().predicate(),
            Bson::Document(doc! { "$in": [oid, "67b3039d85c10e3ee466eccd"] })
        );
        assert!(matches!(
            SensorQueryRequest::new("PH-0042", IdScheme::Either),
            Err(ValidationError::InvalidObjectId { .. })
        ));
    }

    #[test]
    fn test_bounds_builder() {
        let from = Utc.with_ymd_and_hms(2025, 4, 21, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2025, 4, 21, 23, 59, 59).unwrap();

        let request = SensorQueryRequest::new("sensor-1", IdScheme::Opaque)
            .unwrap()
            .with_from(from)
            .with_to(to);
        assert_eq!(request.from(), Some(from));
        assert_eq!(request.to(), Some(to));

        let request = request.with_bounds(None, Some(to));
        assert_eq!(request.from(), None);

        // Inverted bounds are the caller's business
        let inverted = SensorQueryRequest::new("sensor-1", IdScheme::Opaque)
            .unwrap()
            .with_bounds(Some(to), Some(from));
        assert_eq!(inverted.from(), Some(to));
    }

    #[test]
    fn test_parse_instant() {
        assert_eq!(parse_instant("from", None), Ok(None));
        assert_eq!(parse_instant("from", Some("")), Ok(None));
        assert_eq!(
            parse_instant("from", Some("2025-04-21T07:00:00+07:00")),
            Ok(Some(Utc.with_ymd_and_hms(2025, 4, 21, 0, 0, 0).unwrap()))
        );
        assert!(matches!(
            parse_instant("to", Some("yesterday")),
            Err(ValidationError::InvalidParameter { field: "to", .. })
        ));
    }
}
