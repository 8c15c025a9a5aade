//! Query Executor
//!
//! Runs the measurement pipeline against a [`DocumentStore`]:
//!
//! ```text
//! Request → Filter → Store find → Decode (per document) → Assemble → Result
//! ```
//!
//! Every operation runs under one deadline and a cancellation token. When
//! either fires the operation fails as a whole; no partial output escapes.

use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::decode::{
    assemble, Assembled, DecodePolicy, Decoder, DecoderOptions, SensorMeasurementRecord,
};
use crate::query::error::{QueryError, QueryResult};
use crate::query::filter::{build_filter_with, document_id_filter, SingleBoundPolicy};
use crate::query::request::{IdScheme, SensorQueryRequest};
use crate::query::sensors::{self, SensorListRequest};
use crate::store::{DocumentStore, FindOptions};

/// Executor settings
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Collection holding measurement documents
    pub measurements_collection: String,
    /// Collection holding sensor metadata documents
    pub sensors_collection: String,
    /// Deadline for one pipeline execution
    pub timeout: Duration,
    /// Encoding of stored sensor identifiers
    pub id_scheme: IdScheme,
    pub single_bound: SingleBoundPolicy,
    /// Default policy for undecodable documents
    pub decode_policy: DecodePolicy,
    pub decoder: DecoderOptions,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            measurements_collection: "sensor_resource_measurements".to_string(),
            sensors_collection: "sensor_resource_sensors".to_string(),
            timeout: Duration::from_secs(30),
            id_scheme: IdScheme::default(),
            single_bound: SingleBoundPolicy::default(),
            decode_policy: DecodePolicy::default(),
            decoder: DecoderOptions::default(),
        }
    }
}

/// Query executor
pub struct QueryExecutor {
    /// Shared, read-only store handle
    store: Arc<dyn DocumentStore>,
    config: ExecutorConfig,
    decoder: Decoder,
}

impl QueryExecutor {
    /// Create a new query executor
    pub fn new(store: Arc<dyn DocumentStore>, config: ExecutorConfig) -> Self {
        let decoder = Decoder::new(config.decoder);
        Self {
            store,
            config,
            decoder,
        }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Build a request using the configured identifier scheme
    pub fn request(&self, sensor_id: &str) -> QueryResult<SensorQueryRequest> {
        Ok(SensorQueryRequest::new(sensor_id, self.config.id_scheme)?)
    }

    /// Measurements of one sensor, decoded under the configured policy
    pub async fn find_measurements(
        &self,
        request: &SensorQueryRequest,
        options: FindOptions,
        cancel: &CancellationToken,
    ) -> QueryResult<Assembled> {
        self.find_measurements_with(request, options, self.config.decode_policy, cancel)
            .await
    }

    /// Measurements of one sensor, decoded under an explicit policy
    pub async fn find_measurements_with(
        &self,
        request: &SensorQueryRequest,
        options: FindOptions,
        policy: DecodePolicy,
        cancel: &CancellationToken,
    ) -> QueryResult<Assembled> {
        let start = Instant::now();
        let filter = build_filter_with(request, self.config.single_bound);
        tracing::debug!(filter = %filter, ?options, "Measurement filter");

        let assembled = self
            .bounded(cancel, async {
                let documents = self
                    .store
                    .find(&self.config.measurements_collection, filter, options)
                    .await?;
                Ok(assemble(documents, &self.decoder, policy)?)
            })
            .await?;

        tracing::info!(
            sensor = %request.sensor(),
            records = assembled.records.len(),
            skipped = assembled.failures.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Measurement query complete"
        );

        Ok(assembled)
    }

    /// One measurement by document id
    pub async fn find_measurement(
        &self,
        id: &str,
        cancel: &CancellationToken,
    ) -> QueryResult<SensorMeasurementRecord> {
        let filter = document_id_filter(id)?;

        self.bounded(cancel, async {
            let document = self
                .store
                .find_one(&self.config.measurements_collection, filter)
                .await?
                .ok_or_else(|| QueryError::NotFound(format!("measurement {}", id.trim())))?;
            Ok(self.decoder.decode(&document)?)
        })
        .await
    }

    /// Number of measurements a request matches
    pub async fn count_measurements(
        &self,
        request: &SensorQueryRequest,
        cancel: &CancellationToken,
    ) -> QueryResult<u64> {
        let filter = build_filter_with(request, self.config.single_bound);

        self.bounded(cancel, async {
            Ok(self
                .store
                .count(&self.config.measurements_collection, filter)
                .await?)
        })
        .await
    }

    /// Total number of measurement documents
    pub async fn count_all(&self, cancel: &CancellationToken) -> QueryResult<u64> {
        self.bounded(cancel, async {
            Ok(self
                .store
                .count(&self.config.measurements_collection, bson::Document::new())
                .await?)
        })
        .await
    }

    /// Sensor metadata documents as relaxed extended JSON
    pub async fn list_sensors(
        &self,
        request: &SensorListRequest,
        cancel: &CancellationToken,
    ) -> QueryResult<Vec<Value>> {
        let filter = request.filter();
        tracing::debug!(filter = %filter, "Sensor filter");

        self.bounded(cancel, async {
            let documents = self
                .store
                .find(&self.config.sensors_collection, filter, request.options())
                .await?;
            Ok(documents.into_iter().map(sensors::to_json).collect())
        })
        .await
    }

    /// Run `operation` under the configured deadline and `cancel`
    async fn bounded<T, F>(&self, cancel: &CancellationToken, operation: F) -> QueryResult<T>
    where
        F: Future<Output = QueryResult<T>>,
    {
        let timeout = self.config.timeout;

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(QueryError::Canceled),
            result = tokio::time::timeout(timeout, operation) => match result {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(timeout_ms = timeout.as_millis() as u64, "Query deadline exceeded");
                    Err(QueryError::Timeout(timeout))
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::Field;
    use crate::store::{MemoryStore, StoreResult};
    use async_trait::async_trait;
    use bson::{doc, oid::ObjectId, Bson, Document};
    use chrono::{TimeZone, Utc};

    const SENSOR: &str = "67b3039d85c10e3ee466eccd";
    const OTHER_SENSOR: &str = "67b3039d85c10e3ee466ecce";
    const COLLECTION: &str = "sensor_resource_measurements";

    fn measurement(id: &str, sensor: &str, hour: u32, extra: Document) -> Document {
        let at = Utc.with_ymd_and_hms(2025, 4, 21, hour, 0, 0).unwrap();
        let mut document = doc! {
            "_id": ObjectId::parse_str(id).unwrap(),
            "_class": "SensorMeasurement",
            "pId": ObjectId::parse_str("67b3039d85c10e3ee466ec00").unwrap(),
            "sId": ObjectId::parse_str(sensor).unwrap(),
            "st": "PH",
            "t": bson::DateTime::from_chrono(at),
            "v": 7.0 + hour as f64 / 10.0,
            "d": 21,
            "h": hour as i32,
            "m": 0,
            "y": 2025,
        };
        for (key, value) in extra {
            document.insert(key, value);
        }
        document
    }

    fn seeded_store() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::with_collection(
            COLLECTION,
            vec![
                measurement("6805f1b2c3d4e5f6a7b8c901", SENSOR, 3, doc! { "v2": 12_i32 }),
                measurement("6805f1b2c3d4e5f6a7b8c902", OTHER_SENSOR, 4, doc! {}),
                measurement("6805f1b2c3d4e5f6a7b8c903", SENSOR, 1, doc! {}),
                measurement("6805f1b2c3d4e5f6a7b8c904", SENSOR, 2, doc! { "v4": 0.5 }),
            ],
        ))
    }

    fn executor(store: Arc<dyn DocumentStore>) -> QueryExecutor {
        QueryExecutor::new(store, ExecutorConfig::default())
    }

    #[tokio::test]
    async fn test_unbounded_sensor_query() {
        let executor = executor(seeded_store());
        let request = executor.request(SENSOR).unwrap();

        let result = executor
            .find_measurements(&request, FindOptions::new(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.records.len(), 3);
        assert!(result.is_complete());

        // Store order, not time order
        let hours: Vec<i32> = result.records.iter().map(|r| r.h).collect();
        assert_eq!(hours, vec![3, 1, 2]);

        assert_eq!(result.records[0].value2, Some(12.0));
        assert_eq!(result.records[1].value2, None);
        assert_eq!(result.records[1].value3, None);
        assert_eq!(result.records[2].value4, Some(0.5));
        assert!(result.records.iter().all(|r| r.sensor_id == SENSOR));
    }

    #[tokio::test]
    async fn test_range_query_is_inclusive() {
        let executor = executor(seeded_store());
        let from = Utc.with_ymd_and_hms(2025, 4, 21, 1, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2025, 4, 21, 2, 0, 0).unwrap();

        let request = executor.request(SENSOR).unwrap().with_from(from).with_to(to);
        let result = executor
            .find_measurements(&request, FindOptions::new(), &CancellationToken::new())
            .await
            .unwrap();
        let hours: Vec<i32> = result.records.iter().map(|r| r.h).collect();
        assert_eq!(hours, vec![1, 2]);

        let instant = executor.request(SENSOR).unwrap().with_from(to).with_to(to);
        let result = executor
            .find_measurements(&instant, FindOptions::new(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].timestamp, to);
    }

    #[tokio::test]
    async fn test_limit_and_skip_pass_through() {
        let executor = executor(seeded_store());
        let request = executor.request(SENSOR).unwrap();

        let result = executor
            .find_measurements(
                &request,
                FindOptions::new().skip(1).limit(1),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].h, 1);
    }

    #[tokio::test]
    async fn test_decode_policies() {
        let store = seeded_store();
        let mut broken = measurement("6805f1b2c3d4e5f6a7b8c905", SENSOR, 5, doc! {});
        broken.insert("d", Bson::String("21".to_string()));
        store.insert_many(COLLECTION, vec![broken]).await;

        let executor = executor(store);
        let request = executor.request(SENSOR).unwrap();

        let skipped = executor
            .find_measurements(&request, FindOptions::new(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(skipped.records.len(), 3);
        assert_eq!(skipped.failures.len(), 1);
        assert_eq!(skipped.failures[0].error.field, Field::Day);

        let aborted = executor
            .find_measurements_with(
                &request,
                FindOptions::new(),
                DecodePolicy::Abort,
                &CancellationToken::new(),
            )
            .await;
        assert!(matches!(aborted, Err(QueryError::Decode(_))));
    }

    #[tokio::test]
    async fn test_find_measurement_by_id() {
        let executor = executor(seeded_store());

        let record = executor
            .find_measurement("6805f1b2c3d4e5f6a7b8c903", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(record.id, "6805f1b2c3d4e5f6a7b8c903");
        assert_eq!(record.h, 1);
    }

    #[tokio::test]
    async fn test_find_measurement_not_found() {
        let executor = executor(seeded_store());

        let result = executor
            .find_measurement("6805f1b2c3d4e5f6a7b8ffff", &CancellationToken::new())
            .await;
        assert!(matches!(result, Err(QueryError::NotFound(_))));

        let result = executor.find_measurement("", &CancellationToken::new()).await;
        assert!(matches!(result, Err(QueryError::Validation(_))));
    }

    #[tokio::test]
    async fn test_counts() {
        let executor = executor(seeded_store());
        let cancel = CancellationToken::new();

        let request = executor.request(SENSOR).unwrap();
        assert_eq!(executor.count_measurements(&request, &cancel).await.unwrap(), 3);
        assert_eq!(executor.count_all(&cancel).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_list_sensors() {
        let store = Arc::new(MemoryStore::with_collection(
            "sensor_resource_sensors",
            vec![
                doc! { "_id": 3, "type": "PH", "name": "ph-3" },
                doc! { "_id": 1, "type": "DO", "name": "do-1" },
                doc! { "_id": 2, "type": "LUX", "name": "lux-2" },
                doc! { "_id": 0, "type": "PH", "name": "ph-0" },
            ],
        ));
        let executor = executor(store);

        let request = SensorListRequest::new().types(["PH", "DO"]).limit(2).skip(0);
        let sensors = executor
            .list_sensors(&request, &CancellationToken::new())
            .await
            .unwrap();

        let names: Vec<&str> = sensors.iter().map(|s| s["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["ph-0", "do-1"]);
    }

    #[tokio::test]
    async fn test_invalid_sensor_id() {
        let executor = executor(seeded_store());
        assert!(matches!(
            executor.request("not-an-object-id"),
            Err(QueryError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_either_scheme_finds_string_encoded_sensor() {
        let mut documents = vec![measurement("6805f1b2c3d4e5f6a7b8c905", SENSOR, 5, doc! {})];
        let mut as_string = measurement("6805f1b2c3d4e5f6a7b8c906", SENSOR, 6, doc! {});
        as_string.insert("sId", SENSOR);
        documents.push(as_string);
        let store = Arc::new(MemoryStore::with_collection(COLLECTION, documents));

        let strict = executor(store.clone());
        let request = strict.request(SENSOR).unwrap();
        let result = strict
            .find_measurements(&request, FindOptions::new(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(result.records.len(), 1);

        let either = QueryExecutor::new(
            store,
            ExecutorConfig {
                id_scheme: IdScheme::Either,
                ..ExecutorConfig::default()
            },
        );
        let request = either.request(SENSOR).unwrap();
        let result = either
            .find_measurements(&request, FindOptions::new(), &CancellationToken::new())
            .await
            .unwrap();
        let hours: Vec<i32> = result.records.iter().map(|r| r.h).collect();
        assert_eq!(hours, vec![5, 6]);
        assert!(result.records.iter().all(|r| r.sensor_id == SENSOR));
    }

    /// Store whose calls never finish in time
    struct SlowStore;

    #[async_trait]
    impl DocumentStore for SlowStore {
        async fn find(&self, _: &str, _: Document, _: FindOptions) -> StoreResult<Vec<Document>> {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(Vec::new())
        }

        async fn find_one(&self, _: &str, _: Document) -> StoreResult<Option<Document>> {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(None)
        }

        async fn count(&self, _: &str, _: Document) -> StoreResult<u64> {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(0)
        }

        async fn ping(&self) -> StoreResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_timeout() {
        let executor = QueryExecutor::new(
            Arc::new(SlowStore),
            ExecutorConfig {
                timeout: Duration::from_millis(50),
                ..Default::default()
            },
        );
        let request = executor.request(SENSOR).unwrap();

        let result = executor
            .find_measurements(&request, FindOptions::new(), &CancellationToken::new())
            .await;

        assert!(matches!(result, Err(QueryError::Timeout(d)) if d == Duration::from_millis(50)));
    }

    #[tokio::test]
    async fn test_cancellation() {
        let executor = executor(Arc::new(SlowStore));
        let request = executor.request(SENSOR).unwrap();

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let result = executor.count_measurements(&request, &cancel).await;
        assert!(matches!(result, Err(QueryError::Canceled)));
    }
}
