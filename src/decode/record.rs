//! Decoded measurement record
//!
//! The wire names (`pId`, `sensorId`, `sensorType`, ...) are fixed for
//! compatibility with existing consumers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One decoded sensor measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorMeasurementRecord {
    pub id: String,
    pub class: String,
    /// Owning device
    #[serde(rename = "pId")]
    pub device_id: String,
    #[serde(rename = "sensorId")]
    pub sensor_id: String,
    #[serde(rename = "sensorType")]
    pub sensor_type: String,
    /// Measurement instant, serialized as RFC 3339
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub value2: Option<f64>,
    pub value3: Option<f64>,
    pub value4: Option<f64>,
    /// Day of month
    pub d: i32,
    /// Hour of day
    pub h: i32,
    /// Minute of hour
    pub m: i32,
    pub year: i32,
}
