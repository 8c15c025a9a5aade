//! # Sensor Queries
//!
//! Queries sensor measurements stored in MongoDB and decodes documents of
//! drifting shape into one typed record.
//!
//! ## Features
//!
//! - **Mixed encodings**: identifiers as ObjectId or string, timestamps as
//!   BSON datetime, BSON timestamp or RFC 3339 string, numbers as double or
//!   integer
//! - **Inclusive ranges**: optional time bounds on `t`
//! - **Per-document failures**: skip or abort on undecodable documents
//! - **Deadlines**: every query runs under a timeout and a cancellation token
//!
//! ## Modules
//!
//! - [`store`]: `DocumentStore` trait with MongoDB and in-memory backends
//! - [`decode`]: document decoding and batch assembly
//! - [`query`]: request model, predicate construction and executor
//! - [`api`]: REST API server with Axum
//! - [`config`]: TOML configuration with environment overrides
//! - [`telemetry`]: tracing subscriber setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sensor_queries::query::{ExecutorConfig, QueryExecutor};
//! use sensor_queries::store::{FindOptions, MongoStore};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MongoStore::connect("mongodb://localhost:27017", "sensor_resource").await?;
//!     let executor = QueryExecutor::new(Arc::new(store), ExecutorConfig::default());
//!
//!     let request = executor.request("67b3039d85c10e3ee466eccd")?;
//!     let result = executor
//!         .find_measurements(&request, FindOptions::new(), &CancellationToken::new())
//!         .await?;
//!
//!     for record in &result.records {
//!         println!("{} {} {}", record.timestamp, record.sensor_type, record.value);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod decode;
pub mod query;
pub mod store;
pub mod telemetry;

// Re-export top-level types for convenience
pub use store::{DocumentStore, FindOptions, MemoryStore, MongoStore, StoreError, StoreResult};

pub use decode::{
    Assembled, DecodeError, DecodePolicy, Decoder, DecoderOptions, DocumentFailure,
    SensorMeasurementRecord,
};

pub use query::{
    ExecutorConfig, IdScheme, QueryError, QueryExecutor, QueryResult, SensorListRequest,
    SensorQueryRequest, SingleBoundPolicy, ValidationError,
};

pub use api::{build_router, serve, ApiError, AppState};

pub use config::{ApiConfig, Config, ConfigError, LoggingConfig};
