//! Store error types
//!
//! Defines the errors a document store collaborator can report. They are
//! surfaced as-is; retry policy belongs to the driver, not to this crate.

use thiserror::Error;

/// Errors that can occur while talking to the document store
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store could not be reached (DNS, TCP, TLS, server selection)
    #[error("Connection error: {0}")]
    Connection(String),

    /// The store was reached but the command failed
    #[error("Command failed on {collection}: {message}")]
    Command { collection: String, message: String },

    /// Invalid store configuration (bad URI, unknown option)
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Build a command error for a collection
    pub fn command(collection: impl Into<String>, message: impl ToString) -> Self {
        StoreError::Command {
            collection: collection.into(),
            message: message.to_string(),
        }
    }

    /// Classify a driver error raised while operating on `target`
    /// (a collection, or the database for database-level commands)
    pub(crate) fn from_driver(target: &str, err: mongodb::error::Error) -> Self {
        use mongodb::error::ErrorKind;

        match err.kind.as_ref() {
            ErrorKind::InvalidArgument { .. } => StoreError::Config(err.to_string()),
            ErrorKind::Command(_)
            | ErrorKind::Write(_)
            | ErrorKind::BsonDeserialization(_)
            | ErrorKind::BsonSerialization(_) => StoreError::command(target, err),
            _ => StoreError::Connection(err.to_string()),
        }
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
