//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::ApiConfig;
use crate::query::QueryExecutor;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Query executor for running the measurement pipeline
    pub executor: Arc<QueryExecutor>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
    /// Canceled when the server shuts down
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(executor: Arc<QueryExecutor>, config: ApiConfig) -> Self {
        Self {
            executor,
            config: Arc::new(config),
            start_time: Instant::now(),
            shutdown: CancellationToken::new(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Token for one request; canceled with the server
    pub fn request_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }
}
