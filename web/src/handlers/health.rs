//! Health check endpoints.
//!
//! These endpoints are used by load balancers and monitoring systems
//! to verify service health.

use axum::{Json, extract::State, http::StatusCode};
use std::sync::Arc;
use std::time::Instant;
use tasklist_core::todo_store::TodoStore;
use tasklist_runtime::{HealthCheck, HealthReport};

/// Simple health check endpoint (for basic liveness).
///
/// Returns 200 OK to indicate the service is running.
/// This endpoint does NOT check the todo store.
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

/// Check the todo store with a `ping`.
pub async fn todo_store_check(store: &dyn TodoStore) -> HealthCheck {
    let start = Instant::now();
    match store.ping().await {
        Ok(()) => HealthCheck::healthy("todo_store").with_metadata(
            "latency_ms",
            start.elapsed().as_millis().to_string(),
        ),
        Err(error) => {
            tracing::warn!(error = %error, "todo store readiness check failed");
            HealthCheck::unhealthy("todo_store", error.to_string())
        },
    }
}

/// Readiness check against the todo store.
///
/// # Status Codes
///
/// - 200 OK: store reachable
/// - 503 Service Unavailable: store unreachable
///
/// # Endpoint
///
/// ```text
/// GET /health/ready
/// ```
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "checks": [{ "component": "todo_store", "status": "healthy", "metadata": [["latency_ms", "1"]] }],
///   "timestamp": "2025-01-01T00:00:00Z"
/// }
/// ```
pub async fn readiness_check(
    State(store): State<Arc<dyn TodoStore>>,
) -> (StatusCode, Json<HealthReport>) {
    let report = HealthReport::new(vec![todo_store_check(store.as_ref()).await]);

    let status = if report.is_unhealthy() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (status, Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasklist_runtime::HealthStatus;
    use tasklist_testing::InMemoryTodoStore;

    #[tokio::test]
    async fn test_simple_health_check() {
        let (status, body) = health_check().await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_readiness_with_reachable_store() {
        let store: Arc<dyn TodoStore> = Arc::new(InMemoryTodoStore::new());

        let (status, Json(report)) = readiness_check(State(store)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(report.status, HealthStatus::Healthy);
        assert_eq!(report.checks[0].component, "todo_store");
    }

    #[tokio::test]
    async fn test_readiness_with_unreachable_store() {
        let memory = InMemoryTodoStore::new();
        memory.set_unavailable(true);
        let store: Arc<dyn TodoStore> = Arc::new(memory);

        let (status, Json(report)) = readiness_check(State(store)).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(report.is_unhealthy());
        assert!(report.checks[0].message.is_some());
    }
}
