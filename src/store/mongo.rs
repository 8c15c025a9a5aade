//! MongoDB Store
//!
//! [`DocumentStore`] backed by the official MongoDB driver. The client is
//! built once and shared; the driver pools connections internally.

use async_trait::async_trait;
use bson::{doc, Document};
use futures_util::TryStreamExt;
use mongodb::options::{ClientOptions, FindOptions as MongoFindOptions};
use mongodb::{Client, Database};
use std::time::Duration;

use super::error::{StoreError, StoreResult};
use super::types::FindOptions;
use super::DocumentStore;

const APP_NAME: &str = "sensor-queries";

/// Document store talking to a MongoDB database
#[derive(Clone)]
pub struct MongoStore {
    client: Client,
    database: Database,
}

impl MongoStore {
    /// Connect to `uri` and use `database`
    ///
    /// The driver connects lazily; call [`DocumentStore::ping`] to verify the
    /// server is reachable.
    pub async fn connect(uri: &str, database: &str) -> StoreResult<Self> {
        let options = ClientOptions::parse(uri)
            .await
            .map_err(|e| StoreError::from_driver(database, e))?;
        Self::with_options(options, database)
    }

    /// Connect with explicit connect and server selection timeouts
    pub async fn connect_with_timeout(
        uri: &str,
        database: &str,
        timeout: Duration,
    ) -> StoreResult<Self> {
        let mut options = ClientOptions::parse(uri)
            .await
            .map_err(|e| StoreError::from_driver(database, e))?;
        options.connect_timeout = Some(timeout);
        options.server_selection_timeout = Some(timeout);
        Self::with_options(options, database)
    }

    /// Build a store from already parsed client options
    pub fn with_options(mut options: ClientOptions, database: &str) -> StoreResult<Self> {
        if options.app_name.is_none() {
            options.app_name = Some(APP_NAME.to_string());
        }

        let client =
            Client::with_options(options).map_err(|e| StoreError::from_driver(database, e))?;
        let database = client.database(database);

        Ok(Self { client, database })
    }

    /// Name of the database in use
    pub fn database_name(&self) -> &str {
        self.database.name()
    }

    /// Underlying driver client
    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn find(
        &self,
        collection: &str,
        predicate: Document,
        options: FindOptions,
    ) -> StoreResult<Vec<Document>> {
        tracing::debug!(collection, predicate = %predicate, ?options, "find");

        let find_options = MongoFindOptions::builder()
            .sort(options.sort.map(|s| s.to_document()))
            .limit(options.limit)
            .skip(options.skip)
            .build();

        let cursor = self
            .database
            .collection::<Document>(collection)
            .find(predicate, find_options)
            .await
            .map_err(|e| StoreError::from_driver(collection, e))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| StoreError::from_driver(collection, e))
    }

    async fn find_one(
        &self,
        collection: &str,
        predicate: Document,
    ) -> StoreResult<Option<Document>> {
        tracing::debug!(collection, predicate = %predicate, "find_one");

        self.database
            .collection::<Document>(collection)
            .find_one(predicate, None)
            .await
            .map_err(|e| StoreError::from_driver(collection, e))
    }

    async fn count(&self, collection: &str, predicate: Document) -> StoreResult<u64> {
        tracing::debug!(collection, predicate = %predicate, "count");

        self.database
            .collection::<Document>(collection)
            .count_documents(predicate, None)
            .await
            .map_err(|e| StoreError::from_driver(collection, e))
    }

    async fn ping(&self) -> StoreResult<()> {
        self.database
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| StoreError::from_driver(self.database.name(), e))?;
        Ok(())
    }
}
