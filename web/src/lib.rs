//! Axum integration for the tasklist service.
//!
//! This crate holds the HTTP edge shared by tasklist binaries: the
//! [`AppError`] type that turns store and validation failures into JSON
//! error responses, the correlation-id middleware and extractor, and the
//! liveness/readiness handlers.
//!
//! # Request Flow
//!
//! 1. **HTTP Request** arrives; [`tag_correlation_id`] tags it and opens a span
//! 2. **Extract data** from request (JSON body, query string)
//! 3. **Call** the `TodoStore`
//! 4. **Map result** to HTTP response, errors through [`AppError`]
//!
//! # Example
//!
//! ```ignore
//! use tasklist_web::{AppError, tag_correlation_id};
//! use axum::{Router, routing::get, Json};
//!
//! async fn list_todos(
//!     State(store): State<Arc<dyn TodoStore>>,
//! ) -> Result<Json<Vec<Task>>, AppError> {
//!     Ok(Json(store.list(ListQuery::default()).await?))
//! }
//!
//! let app = Router::new()
//!     .route("/api/todos", get(list_todos))
//!     .layer(axum::middleware::from_fn(tag_correlation_id))
//!     .with_state(store);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;

// Re-export key types for convenience
pub use error::AppError;
pub use extractors::CorrelationId;
pub use middleware::{CORRELATION_ID_HEADER, tag_correlation_id};

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
