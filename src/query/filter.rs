//! Filter builder
//!
//! Translates requests into MongoDB predicate documents:
//!
//! ```text
//! { "sId": <sensor> }                                      no bounds
//! { "sId": <sensor>, "t": { "$gte": from, "$lte": to } }   both bounds
//! ```

use bson::{doc, oid::ObjectId, Bson, Document};
use serde::{Deserialize, Serialize};

use super::request::{SensorQueryRequest, ValidationError};

/// Stored key of the document identifier
pub const DOCUMENT_ID_KEY: &str = "_id";
/// Stored key of the owning sensor
pub const SENSOR_ID_KEY: &str = "sId";
/// Stored key of the measurement instant
pub const TIMESTAMP_KEY: &str = "t";

/// What a request carrying only one of `from`/`to` filters on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SingleBoundPolicy {
    /// No time predicate unless both bounds are present
    #[default]
    Ignore,
    /// Use whichever bound is present (`$gte` or `$lte`)
    HalfOpen,
}

/// Predicate for a request; a lone bound is ignored
pub fn build_filter(request: &SensorQueryRequest) -> Document {
    build_filter_with(request, SingleBoundPolicy::Ignore)
}

/// Predicate for a request under an explicit single-bound policy
pub fn build_filter_with(request: &SensorQueryRequest, policy: SingleBoundPolicy) -> Document {
    let mut filter = Document::new();
    filter.insert(SENSOR_ID_KEY, request.sensor().predicate());

    let from = request.from().map(bson::DateTime::from_chrono);
    let to = request.to().map(bson::DateTime::from_chrono);

    let range = match (from, to) {
        (Some(from), Some(to)) => Some(doc! { "$gte": from, "$lte": to }),
        (Some(from), None) if policy == SingleBoundPolicy::HalfOpen => Some(doc! { "$gte": from }),
        (None, Some(to)) if policy == SingleBoundPolicy::HalfOpen => Some(doc! { "$lte": to }),
        (None, None) => None,
        _ => {
            tracing::debug!(sensor = %request.sensor(), "Single time bound ignored");
            None
        }
    };

    if let Some(range) = range {
        filter.insert(TIMESTAMP_KEY, range);
    }

    filter
}

/// Predicate for a single document looked up by id
///
/// A 24-hex id matches the document whether its `_id` was stored as an
/// ObjectId or as a string.
pub fn document_id_filter(id: &str) -> Result<Document, ValidationError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ValidationError::EmptyDocumentId);
    }

    let mut filter = Document::new();
    match ObjectId::parse_str(id) {
        Ok(oid) => {
            filter.insert(
                DOCUMENT_ID_KEY,
                doc! { "$in": [Bson::ObjectId(oid), Bson::String(id.to_string())] },
            );
        }
        Err(_) => {
            filter.insert(DOCUMENT_ID_KEY, id);
        }
    }
    Ok(filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::request::IdScheme;
    use chrono::{TimeZone, Utc};

    const SENSOR: &str = "67b3039d85c10e3ee466eccd";

    fn request() -> SensorQueryRequest {
        SensorQueryRequest::new(SENSOR, IdScheme::ObjectId).unwrap()
    }

    #[test]
    fn test_equality_only_without_bounds() {
        let filter = build_filter(&request());

        let oid = ObjectId::parse_str(SENSOR).unwrap();
        assert_eq!(filter, doc! { "sId": oid });
        assert!(!filter.contains_key("t"));
    }

    #[test]
    fn test_inclusive_range_with_both_bounds() {
        let from = Utc.with_ymd_and_hms(2025, 4, 21, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2025, 4, 21, 23, 59, 59).unwrap();

        let filter = build_filter(&request().with_from(from).with_to(to));

        let range = filter.get_document("t").unwrap();
        assert_eq!(range.get_datetime("$gte").unwrap().to_chrono(), from);
        assert_eq!(range.get_datetime("$lte").unwrap().to_chrono(), to);
        assert_eq!(range.len(), 2);
    }

    #[test]
    fn test_single_bound_is_ignored_by_default() {
        let from = Utc.with_ymd_and_hms(2025, 4, 21, 0, 0, 0).unwrap();

        let only_from = build_filter(&request().with_from(from));
        let only_to = build_filter(&request().with_to(from));

        assert!(!only_from.contains_key("t"));
        assert!(!only_to.contains_key("t"));
    }

    #[test]
    fn test_half_open_policy() {
        let at = Utc.with_ymd_and_hms(2025, 4, 21, 0, 0, 0).unwrap();

        let filter = build_filter_with(&request().with_from(at), SingleBoundPolicy::HalfOpen);
        assert_eq!(
            filter.get_document("t").unwrap(),
            &doc! { "$gte": bson::DateTime::from_chrono(at) }
        );

        let filter = build_filter_with(&request().with_to(at), SingleBoundPolicy::HalfOpen);
        assert_eq!(
            filter.get_document("t").unwrap(),
            &doc! { "$lte": bson::DateTime::from_chrono(at) }
        );
    }

    #[test]
    fn test_opaque_sensor_ids_stay_strings() {
        let request = SensorQueryRequest::new("PH-0042", IdScheme::Opaque).unwrap();
        assert_eq!(build_filter(&request), doc! { "sId": "PH-0042" });
    }

    #[test]
    fn test_either_scheme_matches_both_encodings() {
        let request = SensorQueryRequest::new(SENSOR, IdScheme::Either).unwrap();
        let oid = ObjectId::parse_str(SENSOR).unwrap();
        assert_eq!(
            build_filter(&request),
            doc! { "sId": { "$in": [oid, SENSOR] } }
        );
    }

    #[test]
    fn test_document_id_filter() {
        let oid = ObjectId::parse_str(SENSOR).unwrap();
        assert_eq!(
            document_id_filter(SENSOR).unwrap(),
            doc! { "_id": { "$in": [oid, SENSOR] } }
        );
        assert_eq!(document_id_filter("legacy-1").unwrap(), doc! { "_id": "legacy-1" });
        assert_eq!(document_id_filter(" "), Err(ValidationError::EmptyDocumentId));
    }
}
