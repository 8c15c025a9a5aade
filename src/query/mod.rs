//! Measurement Query Pipeline
//!
//! Turns caller parameters into store predicates and runs them:
//!
//! - **request**: validated `SensorQueryRequest`
//! - **filter**: predicate construction
//! - **sensors**: sensor metadata listing
//! - **executor**: runs the pipeline against a `DocumentStore`
//!
//! # Example
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
//!     println!("Found {} measurements", result.records.len());
//!     Ok(())
//! }
//! ```

mod error;
mod executor;
pub mod filter;
pub mod request;
pub mod sensors;

pub use error::{QueryError, QueryResult};
pub use executor::{ExecutorConfig, QueryExecutor};
pub use filter::{build_filter, build_filter_with, document_id_filter, SingleBoundPolicy};
pub use request::{parse_instant, IdScheme, SensorQueryRequest, SensorRef, ValidationError};
pub use sensors::SensorListRequest;
