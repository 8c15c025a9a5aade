//! Document Store
//!
//! The storage collaborator behind the query pipeline. The pipeline only needs
//! three things from a store: find documents, find one document, count
//! documents. Everything else (connection pooling, retries, server selection)
//! belongs to the implementation.
//!
//! - **types**: `FindOptions`, `SortSpec`
//! - **mongo**: MongoDB implementation
//! - **memory**: in-memory implementation evaluating a subset of the predicate
//!   language, used in tests
//! - **error**: Error types
//!
//! # Example
//!
//! ```rust,no_run
//! use sensor_queries::store::{DocumentStore, FindOptions, MongoStore, SortSpec};
//! use bson::doc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MongoStore::connect("mongodb://localhost:27017", "sensor_resource").await?;
//!
//!     let options = FindOptions::new().sort(SortSpec::ascending("_id")).limit(3);
//!     let sensors = store
//!         .find("sensor_resource_sensors", doc! { "type": { "$in": ["PH", "DO"] } }, options)
//!         .await?;
//!
//!     println!("Found {} sensors", sensors.len());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod memory;
pub mod mongo;
pub mod types;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use mongo::MongoStore;
pub use types::{FindOptions, SortDirection, SortSpec};

use async_trait::async_trait;
use bson::Document;

/// Read access to named collections of raw documents
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Run `predicate` against `collection` and return every matching document
    /// in store order
    async fn find(
        &self,
        collection: &str,
        predicate: Document,
        options: FindOptions,
    ) -> StoreResult<Vec<Document>>;

    /// Return the first document matching `predicate`, if any
    async fn find_one(&self, collection: &str, predicate: Document)
        -> StoreResult<Option<Document>>;

    /// Count documents matching `predicate`
    async fn count(&self, collection: &str, predicate: Document) -> StoreResult<u64>;

    /// Check that the store answers
    async fn ping(&self) -> StoreResult<()>;
}
