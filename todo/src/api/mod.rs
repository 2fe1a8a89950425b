//! HTTP API for the todo resource.
//!
//! Four handlers on one path translate requests into [`TodoStore`] calls;
//! the router adds health, readiness and metrics endpoints plus request
//! tracing.

pub mod dto;
pub mod handlers;

use axum::{Router, extract::FromRef, routing::get};
use std::sync::Arc;
use tasklist_core::environment::Clock;
use tasklist_core::todo_store::TodoStore;
use tasklist_runtime::metrics::MetricsServer;
use tasklist_web::tag_correlation_id;
use tasklist_web::handlers::{health_check, readiness_check};
use tower_http::trace::TraceLayer;

/// Application state shared across all HTTP handlers.
///
/// Cloned (cheaply via `Arc`) for each request.
#[derive(Clone)]
pub struct AppState {
    /// Task persistence
    pub store: Arc<dyn TodoStore>,
    /// Source of `created_at` timestamps
    pub clock: Arc<dyn Clock>,
    /// Prometheus recorder served at `/metrics`
    pub metrics: MetricsServer,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<dyn TodoStore>, clock: Arc<dyn Clock>, metrics: MetricsServer) -> Self {
        Self {
            store,
            clock,
            metrics,
        }
    }
}

// Lets the shared readiness handler extract the store from AppState
impl FromRef<AppState> for Arc<dyn TodoStore> {
    fn from_ref(app_state: &AppState) -> Self {
        Arc::clone(&app_state.store)
    }
}

/// Build the complete Axum router.
///
/// | Route | Methods |
/// |---|---|
/// | `/api/todos` | GET, POST, PUT, DELETE |
/// | `/health` | GET |
/// | `/health/ready` | GET |
/// | `/metrics` | GET |
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new().route(
        "/todos",
        get(handlers::list_todos)
            .post(handlers::create_todo)
            .put(handlers::update_todo)
            .delete(handlers::delete_todo),
    );

    Router::new()
        .route("/health", get(health_check))
        .route("/health/ready", get(readiness_check))
        .route("/metrics", get(handlers::render_metrics))
        .nest("/api", api_routes)
        .layer(axum::middleware::from_fn(tag_correlation_id))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
