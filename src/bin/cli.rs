//! Sensor Queries CLI
//!
//! One-shot queries straight against MongoDB:
//! - List the measurements of a sensor
//! - Fetch one measurement
//! - Count measurements
//! - List sensors by type
//!
//! Results are printed to stdout as pretty JSON, logs go to stderr.

use anyhow::Context;
use clap::{Parser, Subcommand};
use sensor_queries::config::{generate_default_config, Config};
use sensor_queries::decode::DecodePolicy;
use sensor_queries::query::sensors::parse_types;
use sensor_queries::query::{parse_instant, QueryExecutor, SensorListRequest};
use sensor_queries::store::{FindOptions, MongoStore};
use sensor_queries::telemetry::init_tracing;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "sensor-queries-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Query sensor measurements stored in MongoDB")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: usual locations, then environment)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List measurements of one sensor
    Measurements {
        /// Sensor identifier
        #[arg(long)]
        sensor_id: String,
        /// Inclusive lower bound (RFC 3339)
        #[arg(long)]
        from: Option<String>,
        /// Inclusive upper bound (RFC 3339)
        #[arg(long)]
        to: Option<String>,
        #[arg(long)]
        limit: Option<i64>,
        #[arg(long)]
        skip: Option<u64>,
        /// Fail on the first undecodable document instead of skipping it
        #[arg(long)]
        strict: bool,
    },

    /// Fetch one measurement by document id
    Get {
        /// Document identifier
        id: String,
    },

    /// Count measurements (all of them without --sensor-id)
    Count {
        #[arg(long)]
        sensor_id: Option<String>,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
    },

    /// List sensors by type
    Sensors {
        /// Comma separated sensor types
        #[arg(long, default_value = "PH,DO")]
        types: String,
        #[arg(long, default_value = "3")]
        limit: i64,
        #[arg(long, default_value = "0")]
        skip: u64,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cancel = cancel_on_ctrl_c();

    match cli.command {
        Commands::Measurements {
            sensor_id,
            from,
            to,
            limit,
            skip,
            strict,
        } => {
            let executor = connect(cli.config.as_deref()).await?;
            let request = executor.request(&sensor_id)?.with_bounds(
                parse_instant("from", from.as_deref())?,
                parse_instant("to", to.as_deref())?,
            );
            let policy = if strict {
                DecodePolicy::Abort
            } else {
                executor.config().decode_policy
            };

            let assembled = executor
                .find_measurements_with(&request, FindOptions::page(limit, skip), policy, &cancel)
                .await?;

            for failure in &assembled.failures {
                eprintln!("Skipped document #{}: {}", failure.index, failure.error);
            }
            print_json(&assembled.records)?;
        }

        Commands::Get { id } => {
            let executor = connect(cli.config.as_deref()).await?;
            let record = executor.find_measurement(&id, &cancel).await?;
            print_json(&record)?;
        }

        Commands::Count {
            sensor_id,
            from,
            to,
        } => {
            let executor = connect(cli.config.as_deref()).await?;
            let count = match sensor_id {
                None => executor.count_all(&cancel).await?,
                Some(sensor_id) => {
                    let request = executor.request(&sensor_id)?.with_bounds(
                        parse_instant("from", from.as_deref())?,
                        parse_instant("to", to.as_deref())?,
                    );
                    executor.count_measurements(&request, &cancel).await?
                }
            };
            print_json(&serde_json::json!({ "count": count }))?;
        }

        Commands::Sensors { types, limit, skip } => {
            let executor = connect(cli.config.as_deref()).await?;
            let request = SensorListRequest::new()
                .types(parse_types(&types))
                .limit(limit)
                .skip(skip);
            let sensors = executor.list_sensors(&request, &cancel).await?;
            print_json(&sensors)?;
        }

        Commands::Config { output } => {
            let config = generate_default_config();

            match output {
                Some(path) => {
                    // Create parent directory if needed
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    eprintln!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

/// Load config, start logging and build an executor over MongoDB
async fn connect(path: Option<&Path>) -> anyhow::Result<QueryExecutor> {
    let path = path.map(Path::to_path_buf).or_else(Config::default_path);
    let config = match &path {
        Some(path) => Config::load_with_env(path)?,
        None => Config::from_env(),
    };
    init_tracing(&config.logging);

    match &path {
        Some(path) => tracing::debug!("Loaded config from {:?}", path),
        None => tracing::debug!("Using default config with environment overrides"),
    }

    let store = MongoStore::connect_with_timeout(
        &config.database.uri,
        &config.database.name,
        Duration::from_secs(config.database.connect_timeout_secs),
    )
    .await
    .context("failed to configure MongoDB client")?;

    Ok(QueryExecutor::new(Arc::new(store), config.executor_config()))
}

fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });
    cancel
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
