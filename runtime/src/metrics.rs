//! Prometheus metrics for observability and monitoring.
//!
//! This module provides metric collection for:
//! - Todo store operations
//! - HTTP requests served by the API
//! - Reducer execution, effect spawning and store shutdown
//!
//! # Example
//!
//! ```rust,no_run
//! use tasklist_runtime::metrics::MetricsServer;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut server = MetricsServer::new();
//! server.start()?;
//!
//! // Serve `server.render()` from a `/metrics` route
//! # Ok(())
//! # }
//! ```

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;
use thiserror::Error;

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Prometheus recorder whose output is served by the HTTP router.
#[derive(Clone, Default)]
pub struct MetricsServer {
    handle: Option<PrometheusHandle>,
}

impl MetricsServer {
    /// Create an uninstalled metrics server.
    #[must_use]
    pub const fn new() -> Self {
        Self { handle: None }
    }

    /// Register metric descriptions and install the Prometheus recorder.
    ///
    /// # Errors
    ///
    /// Returns error if the exporter cannot be built or installed.
    ///
    /// # Note
    ///
    /// If a recorder is already installed (e.g., by another test), this logs a
    /// warning and leaves [`MetricsServer::render`] returning `None`.
    pub fn start(&mut self) -> Result<(), MetricsError> {
        register_metrics();

        let builder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                &[
                    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
                ],
            )
            .map_err(|e| MetricsError::Build(e.to_string()))?;

        match builder.install_recorder() {
            Ok(handle) => {
                self.handle = Some(handle);
                tracing::info!("Prometheus recorder installed");
                Ok(())
            },
            Err(e) => {
                let err_msg = e.to_string();
                if err_msg.contains("already initialized") {
                    tracing::warn!("Metrics recorder already initialized, skipping re-initialization");
                    Ok(())
                } else {
                    Err(MetricsError::Install(err_msg))
                }
            },
        }
    }

    /// Get the metrics handle for rendering.
    #[must_use]
    pub const fn handle(&self) -> Option<&PrometheusHandle> {
        self.handle.as_ref()
    }

    /// Render current metrics in Prometheus text format.
    ///
    /// Returns `None` if the recorder was not installed by this server.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        self.handle.as_ref().map(PrometheusHandle::render)
    }
}

impl std::fmt::Debug for MetricsServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsServer")
            .field("installed", &self.handle.is_some())
            .finish()
    }
}

/// Register all metric descriptions.
fn register_metrics() {
    // Todo store
    describe_counter!(
        "todo_store_operations_total",
        "Total number of todo store operations, labelled by operation"
    );
    describe_counter!(
        "todo_store_errors_total",
        "Total number of failed todo store operations, labelled by operation"
    );
    describe_counter!(
        "todo_store_rows_listed_total",
        "Total number of tasks returned by list queries"
    );
    describe_histogram!(
        "todo_store_operation_duration_seconds",
        "Time taken by todo store operations"
    );

    // HTTP
    describe_counter!(
        "http_requests_total",
        "Total number of API requests, labelled by operation and status"
    );

    // Reducer
    describe_counter!(
        "reducer_actions_processed_total",
        "Total number of actions processed by reducers"
    );
    describe_histogram!(
        "reducer_execution_duration_seconds",
        "Time taken to execute reducers"
    );

    // Effects
    describe_counter!("effects_spawned_total", "Total number of effect tasks spawned");

    // Store
    describe_counter!(
        "store_actions_rejected_total",
        "Actions refused because the store was shutting down"
    );
    describe_counter!(
        "store_shutdowns_total",
        "Store shutdowns, labelled by outcome"
    );
}

/// Todo store metrics recorder.
pub struct TodoStoreMetrics;

impl TodoStoreMetrics {
    /// Record a completed store operation.
    pub fn record_operation(operation: &'static str, duration: Duration) {
        counter!("todo_store_operations_total", "operation" => operation).increment(1);
        histogram!("todo_store_operation_duration_seconds", "operation" => operation)
            .record(duration.as_secs_f64());
    }

    /// Record the number of tasks a list query returned.
    pub fn record_listed(count: usize) {
        counter!("todo_store_rows_listed_total").increment(count as u64);
    }

    /// Record a failed store operation.
    pub fn record_error(operation: &'static str) {
        counter!("todo_store_errors_total", "operation" => operation).increment(1);
    }
}

/// HTTP metrics recorder.
pub struct HttpMetrics;

impl HttpMetrics {
    /// Record a served API request.
    pub fn record_request(operation: &'static str, status: u16) {
        counter!(
            "http_requests_total",
            "operation" => operation,
            "status" => status.to_string()
        )
        .increment(1);
    }
}

/// Reducer metrics recorder.
pub struct ReducerMetrics;

impl ReducerMetrics {
    /// Record an action processed.
    pub fn record_action(duration: Duration) {
        counter!("reducer_actions_processed_total").increment(1);
        histogram!("reducer_execution_duration_seconds").record(duration.as_secs_f64());
    }
}

/// Effect metrics recorder.
pub struct EffectMetrics;

impl EffectMetrics {
    /// Record an effect task being spawned.
    pub fn record_spawned() {
        counter!("effects_spawned_total").increment(1);
    }
}

/// Store lifecycle metrics recorder.
pub struct StoreMetrics;

impl StoreMetrics {
    /// Record an action refused during shutdown.
    pub fn record_rejected() {
        counter!("store_actions_rejected_total").increment(1);
    }

    /// Record how a shutdown ended (`completed` or `timeout`).
    pub fn record_shutdown(outcome: &'static str) {
        counter!("store_shutdowns_total", "outcome" => outcome).increment(1);
    }
}
