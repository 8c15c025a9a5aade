//! Decode error types

use bson::Bson;
use thiserror::Error;

/// Logical fields of a stored measurement document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Id,
    Class,
    DeviceId,
    SensorId,
    SensorType,
    Timestamp,
    Value,
    Value2,
    Value3,
    Value4,
    Day,
    Hour,
    Minute,
    Year,
}

impl Field {
    /// Key under which the field is stored
    pub fn key(&self) -> &'static str {
        match self {
            Field::Id => "_id",
            Field::Class => "_class",
            Field::DeviceId => "pId",
            Field::SensorId => "sId",
            Field::SensorType => "st",
            Field::Timestamp => "t",
            Field::Value => "v",
            Field::Value2 => "v2",
            Field::Value3 => "v3",
            Field::Value4 => "v4",
            Field::Day => "d",
            Field::Hour => "h",
            Field::Minute => "m",
            Field::Year => "y",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Field::Id => "id",
            Field::Class => "class",
            Field::DeviceId => "deviceId",
            Field::SensorId => "sensorId",
            Field::SensorType => "sensorType",
            Field::Timestamp => "timestamp",
            Field::Value => "value",
            Field::Value2 => "value2",
            Field::Value3 => "value3",
            Field::Value4 => "value4",
            Field::Day => "d",
            Field::Hour => "h",
            Field::Minute => "m",
            Field::Year => "year",
        };
        write!(f, "{}", name)
    }
}

/// Why a single field could not be decoded
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeReason {
    #[error("missing")]
    Missing,

    #[error("expected {expected}, found {found}")]
    UnexpectedType {
        expected: &'static str,
        found: String,
    },

    #[error("invalid timestamp {value:?}: {message}")]
    InvalidTimestamp { value: String, message: String },
}

impl DecodeReason {
    pub(crate) fn unexpected(expected: &'static str, found: &Bson) -> Self {
        DecodeReason::UnexpectedType {
            expected,
            found: format!("{:?}", found.element_type()),
        }
    }
}

/// A raw document did not match the expected shape
#[derive(Error, Debug, Clone, PartialEq)]
#[error(
    "Cannot decode {field} (`{}`) of document {}: {reason}",
    .field.key(),
    .document_id.as_deref().unwrap_or("<unknown>")
)]
pub struct DecodeError {
    /// Logical field that failed
    pub field: Field,
    /// Identifier of the offending document, when it could be read
    pub document_id: Option<String>,
    pub reason: DecodeReason,
}
