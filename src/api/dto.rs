//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use serde::{Deserialize, Serialize};

use crate::decode::{DocumentFailure, SensorMeasurementRecord};

// ============================================
// MEASUREMENT DTOs
// ============================================

/// Query string of `GET /api/v1/measurements`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementParams {
    /// Sensor identifier (required, checked by the handler)
    #[serde(default)]
    pub sensor_id: Option<String>,
    /// Inclusive lower bound (RFC 3339)
    #[serde(default)]
    pub from: Option<String>,
    /// Inclusive upper bound (RFC 3339)
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub skip: Option<u64>,
    /// `skip` or `abort`; defaults to the configured policy
    #[serde(default)]
    pub on_error: Option<String>,
}

/// Query string of `GET /api/v1/measurements/count`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountParams {
    /// Without a sensor every measurement is counted
    #[serde(default)]
    pub sensor_id: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
}

/// Measurement list response
#[derive(Debug, Serialize)]
pub struct MeasurementListResponse {
    /// Decoded records in store order
    pub data: Vec<SensorMeasurementRecord>,
    /// Documents left out because they could not be decoded
    pub failures: Vec<FailureDto>,
    pub meta: ListMeta,
}

/// One document that could not be decoded
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureDto {
    /// Position in the store result
    pub index: usize,
    pub document_id: Option<String>,
    /// Logical field that failed
    pub field: String,
    pub message: String,
}

impl From<DocumentFailure> for FailureDto {
    fn from(failure: DocumentFailure) -> Self {
        Self {
            index: failure.index,
            document_id: failure.document_id,
            field: failure.error.field.to_string(),
            message: failure.error.to_string(),
        }
    }
}

/// List metadata
#[derive(Debug, Serialize)]
pub struct ListMeta {
    /// Number of records returned
    pub count: usize,
    /// Number of documents skipped
    pub skipped: usize,
    /// Execution time in milliseconds
    pub execution_time_ms: u64,
}

/// Count response
#[derive(Debug, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: u64,
}

// ============================================
// SENSOR DTOs
// ============================================

/// Query string of `GET /api/v1/sensors`
#[derive(Debug, Default, Deserialize)]
pub struct SensorParams {
    /// Comma separated sensor types, e.g. `PH,DO`
    #[serde(default)]
    pub types: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub skip: Option<u64>,
}

/// Sensor list response
#[derive(Debug, Serialize)]
pub struct SensorListResponse {
    /// Sensor documents as relaxed extended JSON
    pub data: Vec<serde_json::Value>,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: healthy or unhealthy
    pub status: String,
    /// Document store status
    pub store: String,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{DecodeError, DecodeReason, Field};

    #[test]
    fn test_measurement_params_camel_case() {
        let params: MeasurementParams = serde_json::from_str(
            r#"{"sensorId": "67b3039d85c10e3ee466eccd", "onError": "abort", "limit": 5}"#,
        )
        .unwrap();

        assert_eq!(params.sensor_id.as_deref(), Some("67b3039d85c10e3ee466eccd"));
        assert_eq!(params.on_error.as_deref(), Some("abort"));
        assert_eq!(params.limit, Some(5));
        assert!(params.from.is_none());
    }

    #[test]
    fn test_failure_dto() {
        let failure = DocumentFailure {
            index: 2,
            document_id: Some("abc".to_string()),
            error: DecodeError {
                field: Field::Timestamp,
                document_id: Some("abc".to_string()),
                reason: DecodeReason::Missing,
            },
        };

        let json = serde_json::to_value(FailureDto::from(failure)).unwrap();
        assert_eq!(json["index"], 2);
        assert_eq!(json["documentId"], "abc");
        assert_eq!(json["field"], "timestamp");
    }
}
