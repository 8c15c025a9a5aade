//! Measurement Decoding
//!
//! Stored measurement documents drift in shape: identifiers are sometimes
//! ObjectIds and sometimes strings, timestamps arrive in three encodings,
//! numbers come as doubles or integers, and `v2`..`v4` are often absent.
//! This module turns them into one typed record.
//!
//! - **fields**: one decoder per kind of logical field
//! - **decoder**: whole-document decoding
//! - **record**: the decoded `SensorMeasurementRecord`
//! - **assembler**: batch decoding with an abort/skip policy
//! - **error**: `DecodeError`
//!
//! # Pipeline
//!
//! ```text
//! raw documents → Decoder (per document) → Assembler → records (store order)
//! ```

pub mod assembler;
pub mod decoder;
pub mod error;
pub mod fields;
pub mod record;

pub use assembler::{assemble, Assembled, DecodePolicy, DocumentFailure};
pub use decoder::{Decoder, DecoderOptions};
pub use error::{DecodeError, DecodeReason, Field};
pub use record::SensorMeasurementRecord;
