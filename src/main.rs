//! Sensor Queries API Server
//!
//! Run with: cargo run --bin sensor-queries [-- path/to/config.toml]
//!
//! # Configuration
//!
//! Without a path the config is looked up in the usual locations (see
//! [`Config::default_path`]). Environment variables override file settings:
//! - `MONGODB_URI`: MongoDB connection string
//! - `MONGODB_DATABASE`: Database name
//! - `SENSOR_QUERIES_API_HOST` / `SENSOR_QUERIES_API_PORT`: Bind address
//! - `SENSOR_QUERIES_QUERY_TIMEOUT_SECS`: Deadline per query
//! - `SENSOR_QUERIES_LOG_LEVEL` / `SENSOR_QUERIES_LOG_FORMAT`: Logging
//! - `RUST_LOG`: Overrides the log level

use anyhow::Context;
use sensor_queries::api::{serve, AppState};
use sensor_queries::config::Config;
use sensor_queries::query::QueryExecutor;
use sensor_queries::store::MongoStore;
use sensor_queries::telemetry::init_tracing;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(Config::default_path);
    let config = match &path {
        Some(path) => Config::load_with_env(path)?,
        None => Config::from_env(),
    };

    init_tracing(&config.logging);

    match &path {
        Some(path) => tracing::info!("Loaded config from {:?}", path),
        None => tracing::info!("Using default config with environment overrides"),
    }

    tracing::info!("Starting sensor queries API v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        database = %config.database.name,
        collection = %config.database.measurements_collection,
        timeout_secs = config.query.timeout_secs,
        "Query settings"
    );

    let store = MongoStore::connect_with_timeout(
        &config.database.uri,
        &config.database.name,
        Duration::from_secs(config.database.connect_timeout_secs),
    )
    .await
    .context("failed to configure MongoDB client")?;

    let executor = Arc::new(QueryExecutor::new(
        Arc::new(store),
        config.executor_config(),
    ));

    match executor.store().ping().await {
        Ok(()) => tracing::info!("MongoDB connection verified"),
        Err(e) => tracing::warn!("MongoDB not reachable yet: {} (readiness will fail)", e),
    }

    let state = AppState::new(executor, config.api.clone());
    serve(state, &config.api).await?;

    Ok(())
}
