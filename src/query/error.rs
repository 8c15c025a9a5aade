//! Query error types
//!
//! Defines all error conditions the query pipeline can return to its caller.
//! None of them terminates the process; binaries decide what to do.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during query operations
#[derive(Error, Debug)]
pub enum QueryError {
    /// Request parameters missing or malformed
    #[error("Validation error: {0}")]
    Validation(#[from] crate::query::request::ValidationError),

    /// Store unreachable or the call failed
    #[error("Store error: {0}")]
    Connection(#[from] crate::store::StoreError),

    /// A raw document did not match the expected shape
    #[error("Decode error: {0}")]
    Decode(#[from] crate::decode::DecodeError),

    /// A single-document lookup matched nothing
    #[error("Not found: {0}")]
    NotFound(String),

    /// The pipeline did not finish within its deadline
    #[error("Query timed out after {0:?}")]
    Timeout(Duration),

    /// The caller canceled the pipeline
    #[error("Query canceled")]
    Canceled,
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;
