//! Handlers for `/api/todos` and `/metrics`.
//!
//! - GET /api/todos?filter=&sort= - List tasks
//! - POST /api/todos - Create a task
//! - PUT /api/todos - Partially update a task
//! - DELETE /api/todos - Delete a task

use super::AppState;
use super::dto::{
    CreateTodoRequest, DeleteTodoRequest, DeleteTodoResponse, ListParams, UpdateTodoRequest,
};
use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use tasklist_core::todo::{Task, TaskId};
use tasklist_runtime::metrics::HttpMetrics;
use tasklist_web::{AppError, CorrelationId};

/// Records the request outcome under `operation`.
fn observe<T>(operation: &'static str, success: StatusCode, result: &Result<T, AppError>) {
    let status = match result {
        Ok(_) => success,
        Err(error) => error.status(),
    };
    HttpMetrics::record_request(operation, status.as_u16());
}

/// Unwraps a JSON body, answering malformed input with a 400 in the API's error shape.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::bad_request(rejection.body_text()))
}

/// List tasks.
///
/// ```bash
/// curl 'http://localhost:3000/api/todos?filter=active&sort=deadline'
/// ```
///
/// # Errors
///
/// 500 when the store fails.
pub async fn list_todos(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Task>>, AppError> {
    let query = params.to_query();
    tracing::debug!(correlation_id = %correlation_id.0, filter = %query.filter, sort = %query.sort, "Listing todos");

    let result = state.store.list(query).await.map_err(AppError::from);
    observe("list", StatusCode::OK, &result);
    result.map(Json)
}

/// Create a task.
///
/// ```bash
/// curl -X POST http://localhost:3000/api/todos \
///   -H "Content-Type: application/json" \
///   -d '{"title": "Buy milk", "deadline": "2025-01-02T10:00"}'
/// ```
///
/// # Errors
///
/// 400 for a missing/empty title or an unparseable deadline, 500 when the store fails.
pub async fn create_todo(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    payload: Result<Json<CreateTodoRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let result: Result<Task, AppError> = async {
        let new_task = json_body(payload)?.into_new_task()?;
        let created_at = state.clock.now();
        Ok(state.store.create(new_task, created_at).await?)
    }
    .await;

    observe("create", StatusCode::CREATED, &result);
    let task = result?;
    tracing::info!(correlation_id = %correlation_id.0, id = %task.id, "Todo created");

    Ok((StatusCode::CREATED, Json(task)))
}

/// Partially update a task.
///
/// ```bash
/// curl -X PUT http://localhost:3000/api/todos \
///   -H "Content-Type: application/json" \
///   -d '{"id": 1, "completed": true}'
/// ```
///
/// # Errors
///
/// 400 for an empty title or unparseable deadline, 404 for an unknown id,
/// 500 when the store fails.
pub async fn update_todo(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    payload: Result<Json<UpdateTodoRequest>, JsonRejection>,
) -> Result<Json<Task>, AppError> {
    let result: Result<Task, AppError> = async {
        let (id, patch) = json_body(payload)?.into_patch()?;
        Ok(state.store.update(id, patch).await?)
    }
    .await;

    observe("update", StatusCode::OK, &result);
    let task = result?;
    tracing::info!(correlation_id = %correlation_id.0, id = %task.id, "Todo updated");

    Ok(Json(task))
}

/// Delete a task.
///
/// ```bash
/// curl -X DELETE http://localhost:3000/api/todos \
///   -H "Content-Type: application/json" \
///   -d '{"id": 1}'
/// ```
///
/// # Errors
///
/// 404 for an unknown id, 500 when the store fails.
pub async fn delete_todo(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    payload: Result<Json<DeleteTodoRequest>, JsonRejection>,
) -> Result<Json<DeleteTodoResponse>, AppError> {
    let result: Result<TaskId, AppError> = async {
        let request = json_body(payload)?;
        state.store.delete(request.id).await?;
        Ok(request.id)
    }
    .await;

    observe("delete", StatusCode::OK, &result);
    let id = result?;
    tracing::info!(correlation_id = %correlation_id.0, %id, "Todo deleted");

    Ok(Json(DeleteTodoResponse { success: true }))
}

/// Prometheus text exposition of the process metrics.
///
/// Empty when this process did not install the recorder.
pub async fn render_metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [("content-type", "text/plain; version=0.0.4")],
        state.metrics.render().unwrap_or_default(),
    )
}
