//! Response assembler
//!
//! Runs the decoder over a batch of raw documents in store order.

use bson::Document;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::decoder::Decoder;
use super::error::DecodeError;
use super::record::SensorMeasurementRecord;

/// What to do when one document of a batch fails to decode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodePolicy {
    /// Fail the whole batch on the first bad document
    Abort,
    /// Leave bad documents out and report them in [`Assembled::failures`]
    #[default]
    Skip,
}

impl FromStr for DecodePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "abort" => Ok(DecodePolicy::Abort),
            "skip" => Ok(DecodePolicy::Skip),
            other => Err(format!(
                "unknown decode policy '{}', expected 'abort' or 'skip'",
                other
            )),
        }
    }
}

/// A document left out of the response
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentFailure {
    /// Position of the document in the store result
    pub index: usize,
    pub document_id: Option<String>,
    pub error: DecodeError,
}

/// Decoded records in store order plus the documents that were skipped
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assembled {
    pub records: Vec<SensorMeasurementRecord>,
    pub failures: Vec<DocumentFailure>,
}

impl Assembled {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// True when no document was skipped
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Decode `documents` in order
///
/// Raw documents are consumed; none is retained once decoded.
pub fn assemble(
    documents: Vec<Document>,
    decoder: &Decoder,
    policy: DecodePolicy,
) -> Result<Assembled, DecodeError> {
    let mut assembled = Assembled {
        records: Vec::with_capacity(documents.len()),
        failures: Vec::new(),
    };

    for (index, document) in documents.into_iter().enumerate() {
        match decoder.decode(&document) {
            Ok(record) => assembled.records.push(record),
            Err(error) => match policy {
                DecodePolicy::Abort => return Err(error),
                DecodePolicy::Skip => {
                    tracing::warn!(index, error = %error, "Skipping undecodable document");
                    assembled.failures.push(DocumentFailure {
                        index,
                        document_id: error.document_id.clone(),
                        error,
                    });
                }
            },
        }
    }

    Ok(assembled)
}
