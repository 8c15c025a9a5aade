//! Measurement document decoder
//!
//! Turns one raw stored document into a [`SensorMeasurementRecord`] or a
//! [`DecodeError`]. Fields are decoded independently; the first failing field
//! aborts the document, so a record is never partially filled.

use bson::Document;
use chrono::{DateTime, Utc};

use super::error::{DecodeError, DecodeReason, Field};
use super::fields;
use super::record::SensorMeasurementRecord;

/// Decoder behaviour switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderOptions {
    /// Decode a missing or unreadable timestamp as the Unix epoch instead of
    /// failing the document
    pub lenient_timestamps: bool,
}

/// Stateless measurement decoder
#[derive(Debug, Clone, Copy, Default)]
pub struct Decoder {
    options: DecoderOptions,
}

impl Decoder {
    pub fn new(options: DecoderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> DecoderOptions {
        self.options
    }

    /// Decode one raw measurement document
    pub fn decode(&self, document: &Document) -> Result<SensorMeasurementRecord, DecodeError> {
        let reader = FieldReader::new(document);

        Ok(SensorMeasurementRecord {
            id: reader.read(Field::Id, fields::identifier)?,
            class: reader.read(Field::Class, fields::string)?,
            device_id: reader.read(Field::DeviceId, fields::identifier)?,
            sensor_id: reader.read(Field::SensorId, fields::identifier)?,
            sensor_type: reader.read(Field::SensorType, fields::string)?,
            timestamp: self.timestamp(&reader)?,
            value: reader.read(Field::Value, fields::number)?,
            value2: reader.read(Field::Value2, fields::optional_number)?,
            value3: reader.read(Field::Value3, fields::optional_number)?,
            value4: reader.read(Field::Value4, fields::optional_number)?,
            d: reader.read(Field::Day, fields::int32)?,
            h: reader.read(Field::Hour, fields::int32)?,
            m: reader.read(Field::Minute, fields::int32)?,
            year: reader.read(Field::Year, fields::int32)?,
        })
    }

    fn timestamp(&self, reader: &FieldReader<'_>) -> Result<DateTime<Utc>, DecodeError> {
        match reader.read(Field::Timestamp, fields::timestamp) {
            Err(err) if self.options.lenient_timestamps => {
                tracing::warn!(
                    document_id = err.document_id.as_deref().unwrap_or("<unknown>"),
                    reason = %err.reason,
                    "Unreadable timestamp, using Unix epoch"
                );
                Ok(DateTime::<Utc>::UNIX_EPOCH)
            }
            result => result,
        }
    }
}

/// Reads fields of one document, attaching field and document id to failures
struct FieldReader<'a> {
    document: &'a Document,
    document_id: Option<String>,
}

impl<'a> FieldReader<'a> {
    fn new(document: &'a Document) -> Self {
        Self {
            document,
            document_id: fields::identifier(document.get(Field::Id.key())).ok(),
        }
    }

    fn read<T>(
        &self,
        field: Field,
        decode: impl FnOnce(Option<&bson::Bson>) -> Result<T, DecodeReason>,
    ) -> Result<T, DecodeError> {
        decode(self.document.get(field.key())).map_err(|reason| DecodeError {
            field,
            document_id: self.document_id.clone(),
            reason,
        })
    }
}
