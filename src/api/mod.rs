//! Sensor Queries REST API
//!
//! HTTP API layer over the measurement pipeline, built with Axum.
//!
//! # Endpoints
//!
//! ## Measurements
//! - `GET /api/v1/measurements?sensorId=&from=&to=&limit=&skip=&onError=` - Measurements of one sensor
//! - `GET /api/v1/measurements/count?sensorId=&from=&to=` - Count measurements
//! - `GET /api/v1/measurements/:id` - One measurement
//!
//! ## Sensors
//! - `GET /api/v1/sensors?types=PH,DO&limit=&skip=` - Sensor metadata
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use sensor_queries::api::{serve, AppState};
//! use sensor_queries::config::ApiConfig;
//! use sensor_queries::query::{ExecutorConfig, QueryExecutor};
//! use sensor_queries::store::MongoStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MongoStore::connect("mongodb://localhost:27017", "sensor_resource").await?;
//!     let executor = Arc::new(QueryExecutor::new(Arc::new(store), ExecutorConfig::default()));
//!     let config = ApiConfig::default();
//!
//!     serve(AppState::new(executor, config.clone()), &config).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{http::HeaderValue, routing::get, Router};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::ApiConfig;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Measurement routes
        .route("/measurements", get(routes::measurements::list_measurements))
        .route(
            "/measurements/count",
            get(routes::measurements::count_measurements),
        )
        .route("/measurements/:id", get(routes::measurements::get_measurement))
        // Sensor routes
        .route("/sensors", get(routes::sensors::list_sensors));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let cors = cors_layer(&state.config);

    // Create shared state
    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

/// Permissive without configured origins, otherwise an allow list
fn cors_layer(config: &ApiConfig) -> CorsLayer {
    if config.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Start the API server
///
/// In-flight queries are canceled through [`AppState::shutdown`] once a
/// shutdown signal arrives.
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let shutdown = state.shutdown.clone();
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Sensor queries API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            shutdown.cancel();
        })
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Sensor queries API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
