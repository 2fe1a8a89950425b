//! Router tests for the todo HTTP API, backed by the in-memory store.

#![allow(clippy::unwrap_used)]

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use serde_json::{Value, json};
use std::sync::Arc;
use tasklist_core::todo::TaskId;
use tasklist_runtime::metrics::MetricsServer;
use tasklist_testing::{InMemoryTodoStore, test_clock};
use todo::{AppState, build_router};
use tower::ServiceExt;

fn app(store: &InMemoryTodoStore) -> Router {
    let state = AppState::new(
        Arc::new(store.clone()),
        Arc::new(test_clock()),
        MetricsServer::new(),
    );
    build_router(state)
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header("content-type", "application/json");
            Body::from(json.to_string())
        },
        None => Body::empty(),
    };
    app.clone().oneshot(request.body(body).unwrap()).await.unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn create(app: &Router, body: Value) -> Value {
    let response = call(app, Method::POST, "/api/todos", Some(body)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    json_body(response).await
}

fn titles(list: &Value) -> Vec<&str> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|task| task["title"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn create_returns_created_task() {
    let store = InMemoryTodoStore::new();
    let app = app(&store);

    let task = create(&app, json!({ "title": "Buy milk", "deadline": "2025-01-02T10:00" })).await;

    assert_eq!(task["id"], 1);
    assert_eq!(task["title"], "Buy milk");
    assert_eq!(task["completed"], false);
    assert_eq!(task["deadline"], "2025-01-02T10:00:00Z");
    assert_eq!(task["createdAt"], "2025-01-01T00:00:00Z");
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn create_without_title_is_rejected() {
    let store = InMemoryTodoStore::new();
    let app = app(&store);

    for body in [json!({}), json!({ "title": "" }), json!({ "title": "a", "deadline": "soon" })] {
        let response = call(&app, Method::POST, "/api/todos", Some(body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["code"], "BAD_REQUEST");
    }
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let store = InMemoryTodoStore::new();
    let app = app(&store);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/todos")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_filters_and_sorts() {
    let store = InMemoryTodoStore::new();
    let app = app(&store);

    create(&app, json!({ "title": "no deadline" })).await;
    create(&app, json!({ "title": "late", "deadline": "2025-03-01T00:00" })).await;
    create(&app, json!({ "title": "soon", "deadline": "2025-02-01T00:00" })).await;
    call(&app, Method::PUT, "/api/todos", Some(json!({ "id": 2, "completed": true }))).await;

    let newest = json_body(call(&app, Method::GET, "/api/todos", None).await).await;
    assert_eq!(titles(&newest), vec!["soon", "late", "no deadline"]);

    let by_deadline =
        json_body(call(&app, Method::GET, "/api/todos?sort=deadline", None).await).await;
    assert_eq!(titles(&by_deadline), vec!["soon", "late", "no deadline"]);

    let active = json_body(call(&app, Method::GET, "/api/todos?filter=active", None).await).await;
    assert_eq!(titles(&active), vec!["soon", "no deadline"]);

    let completed =
        json_body(call(&app, Method::GET, "/api/todos?filter=completed", None).await).await;
    assert_eq!(titles(&completed), vec!["late"]);

    let unknown = call(&app, Method::GET, "/api/todos?filter=bogus&sort=bogus", None).await;
    assert_eq!(unknown.status(), StatusCode::OK);
    assert_eq!(json_body(unknown).await.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn update_is_partial() {
    let store = InMemoryTodoStore::new();
    let app = app(&store);
    create(&app, json!({ "title": "Read", "deadline": "2025-01-05T09:00" })).await;

    let response = call(&app, Method::PUT, "/api/todos", Some(json!({ "id": 1, "completed": true }))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let task = json_body(response).await;
    assert_eq!(task["completed"], true);
    assert_eq!(task["title"], "Read");
    assert_eq!(task["deadline"], "2025-01-05T09:00:00Z");

    let cleared =
        json_body(call(&app, Method::PUT, "/api/todos", Some(json!({ "id": 1, "deadline": null }))).await)
            .await;
    assert_eq!(cleared["deadline"], Value::Null);
    assert_eq!(cleared["completed"], true);
}

#[tokio::test]
async fn update_rejects_empty_title_and_unknown_id() {
    let store = InMemoryTodoStore::new();
    let app = app(&store);
    create(&app, json!({ "title": "Read" })).await;

    let empty = call(&app, Method::PUT, "/api/todos", Some(json!({ "id": 1, "title": "" }))).await;
    assert_eq!(empty.status(), StatusCode::BAD_REQUEST);
    assert_eq!(store.get(TaskId::new(1)).await.unwrap().title, "Read");

    let missing = call(&app, Method::PUT, "/api/todos", Some(json!({ "id": 42, "completed": true }))).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    let body = json_body(missing).await;
    assert_eq!(body["code"], "NOT_FOUND");
    assert_eq!(body["message"], "Todo with id 42 not found");
}

#[tokio::test]
async fn delete_removes_task() {
    let store = InMemoryTodoStore::new();
    let app = app(&store);
    create(&app, json!({ "title": "Read" })).await;
    create(&app, json!({ "title": "Write" })).await;

    let response = call(&app, Method::DELETE, "/api/todos", Some(json!({ "id": 1 }))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "success": true }));
    assert_eq!(store.len().await, 1);

    let again = call(&app, Method::DELETE, "/api/todos", Some(json!({ "id": 1 }))).await;
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(again).await["code"], "NOT_FOUND");

    assert_eq!(store.len().await, 1);
    assert_eq!(store.get(TaskId::new(2)).await.unwrap().title, "Write");
}

#[tokio::test]
async fn store_failure_is_internal_error() {
    let store = InMemoryTodoStore::new();
    let app = app(&store);
    store.set_unavailable(true);

    let response = call(&app, Method::GET, "/api/todos", None).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await["code"], "INTERNAL_SERVER_ERROR");
}

#[tokio::test]
async fn responses_carry_correlation_id() {
    let store = InMemoryTodoStore::new();
    let app = app(&store);

    let request = Request::builder()
        .uri("/api/todos")
        .header("X-Correlation-ID", "6f9619ff-8b86-d011-b42d-00c04fc964ff")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(
        response.headers()["X-Correlation-ID"],
        "6f9619ff-8b86-d011-b42d-00c04fc964ff"
    );

    let generated = call(&app, Method::GET, "/health", None).await;
    assert!(generated.headers().contains_key("X-Correlation-ID"));
}

#[tokio::test]
async fn health_and_readiness() {
    let store = InMemoryTodoStore::new();
    let app = app(&store);

    let live = call(&app, Method::GET, "/health", None).await;
    assert_eq!(live.status(), StatusCode::OK);

    let ready = call(&app, Method::GET, "/health/ready", None).await;
    assert_eq!(ready.status(), StatusCode::OK);

    store.set_unavailable(true);
    let not_ready = call(&app, Method::GET, "/health/ready", None).await;
    assert_eq!(not_ready.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn metrics_endpoint_answers_without_recorder() {
    let store = InMemoryTodoStore::new();
    let app = app(&store);

    let response = call(&app, Method::GET, "/metrics", None).await;
    assert_eq!(response.status(), StatusCode::OK);
}
