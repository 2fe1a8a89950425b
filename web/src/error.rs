//! Error types for web handlers.
//!
//! This module defines the error type that bridges store and validation
//! errors to HTTP responses, implementing Axum's `IntoResponse` trait.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;
use tasklist_core::todo::TaskValidationError;
use tasklist_core::todo_store::TodoStoreError;

/// Application error type for web handlers.
///
/// Renders as `{"code": ..., "message": ...}` with the matching status.
/// Server errors are logged; the source error is kept for logging only.
///
/// # Examples
///
/// ```ignore
/// async fn handler(State(state): State<AppState>) -> Result<Json<Vec<Task>>, AppError> {
///     let tasks = state.store.list(ListQuery::default()).await?;
///     Ok(Json(tasks))
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Error code (for client error handling)
    code: String,
    /// Internal error (for logging, not exposed to client)
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String, code: String) -> Self {
        Self {
            status,
            message,
            code,
            source: None,
        }
    }

    /// Create a new error with a source error.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// Create a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            message.into(),
            "BAD_REQUEST".to_string(),
        )
    }

    /// Create a 404 Not Found error.
    #[must_use]
    pub fn not_found(resource: impl fmt::Display, id: impl fmt::Display) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            format!("{resource} with id {id} not found"),
            "NOT_FOUND".to_string(),
        )
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message.into(),
            "INTERNAL_SERVER_ERROR".to_string(),
        )
    }

    /// HTTP status this error renders with.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// User-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// Error code (for client error handling).
    code: String,
    /// Human-readable error message.
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            if let Some(source) = &self.source {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    error = %source,
                    "Internal server error"
                );
            } else {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    "Internal server error"
                );
            }
        }

        let body = ErrorResponse {
            code: self.code,
            message: self.message,
        };

        (self.status, Json(body)).into_response()
    }
}

/// Convert `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal("An internal error occurred").with_source(err)
    }
}

impl From<TaskValidationError> for AppError {
    fn from(err: TaskValidationError) -> Self {
        Self::bad_request(err.to_string())
    }
}

/// Not found → 404, validation → 400, database → 500 (details logged, not returned).
impl From<TodoStoreError> for AppError {
    fn from(err: TodoStoreError) -> Self {
        match err {
            TodoStoreError::NotFound(id) => Self::not_found("Todo", id),
            TodoStoreError::Validation(validation) => validation.into(),
            TodoStoreError::DatabaseError(_) => {
                Self::internal("An internal error occurred").with_source(anyhow::Error::new(err))
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasklist_core::todo::TaskId;

    #[test]
    fn test_error_display() {
        let err = AppError::bad_request("Invalid input");
        assert_eq!(err.to_string(), "[BAD_REQUEST] Invalid input");
    }

    #[test]
    fn test_not_found() {
        let err = AppError::not_found("Todo", "123");
        assert_eq!(err.to_string(), "[NOT_FOUND] Todo with id 123 not found");
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_store_errors_map_to_statuses() {
        let missing: AppError = TodoStoreError::NotFound(TaskId::new(7)).into();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert_eq!(missing.message(), "Todo with id 7 not found");

        let invalid: AppError = TodoStoreError::Validation(TaskValidationError::EmptyTitle).into();
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
        assert_eq!(invalid.message(), "Title is required");

        let db: AppError = TodoStoreError::DatabaseError("connection refused".to_string()).into();
        assert_eq!(db.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(db.code(), "INTERNAL_SERVER_ERROR");
        assert!(!db.message().contains("connection refused"));
        assert!(std::error::Error::source(&db).is_some());
    }

    #[tokio::test]
    #[allow(clippy::unwrap_used)]
    async fn test_response_body_is_code_and_message() {
        let response = AppError::bad_request("Title is required").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"code": "BAD_REQUEST", "message": "Title is required"})
        );
    }
}
