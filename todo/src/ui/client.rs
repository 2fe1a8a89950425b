//! `reqwest` implementation of the todo API client.

use crate::config::ClientConfig;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use std::time::Duration;
use tasklist_core::todo::{ListQuery, Task, TaskId, format_deadline_rfc3339};

pub use tasklist_core::todo_api::{ApiError, ApiFuture, TodoApi, UpdateRequest};

/// Error body the server sends with every non-success status
#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Todo API client over HTTP
#[derive(Clone, Debug)]
pub struct HttpTodoApi {
    client: Client,
    base_url: String,
}

impl HttpTodoApi {
    /// Create a client for the API rooted at `base_url` (e.g. `http://localhost:3000/api`)
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self { client, base_url })
    }

    /// Create a client from configuration
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        Self::new(config.base_url.clone(), config.timeout())
    }

    fn todos_url(&self) -> String {
        format!("{}/todos", self.base_url)
    }

    async fn send(request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body).map_or_else(
            |_| status.canonical_reason().unwrap_or("Unknown error").to_string(),
            |error| error.message,
        );
        tracing::debug!(status = status.as_u16(), %message, "Todo API call failed");

        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
        Self::send(request)
            .await?
            .json::<T>()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))
    }
}

/// JSON body of an update; a cleared deadline is sent as `null`
fn update_body(request: &UpdateRequest) -> Value {
    let mut body = Map::new();
    body.insert("id".to_string(), json!(request.id));
    if let Some(title) = &request.title {
        body.insert("title".to_string(), json!(title));
    }
    if let Some(completed) = request.completed {
        body.insert("completed".to_string(), json!(completed));
    }
    if let Some(deadline) = request.deadline {
        body.insert(
            "deadline".to_string(),
            json!(deadline.map(format_deadline_rfc3339)),
        );
    }
    Value::Object(body)
}

impl TodoApi for HttpTodoApi {
    fn list(&self, query: ListQuery) -> ApiFuture<'_, Vec<Task>> {
        let url = format!(
            "{}?filter={}&sort={}",
            self.todos_url(),
            query.filter.as_str(),
            query.sort.as_str()
        );
        Box::pin(Self::send_json(self.client.get(url)))
    }

    fn create(&self, title: String, deadline: Option<DateTime<Utc>>) -> ApiFuture<'_, Task> {
        let body = json!({
            "title": title,
            "deadline": deadline.map(format_deadline_rfc3339),
        });
        Box::pin(Self::send_json(self.client.post(self.todos_url()).json(&body)))
    }

    fn update(&self, request: UpdateRequest) -> ApiFuture<'_, Task> {
        let body = update_body(&request);
        Box::pin(Self::send_json(self.client.put(self.todos_url()).json(&body)))
    }

    fn delete(&self, id: TaskId) -> ApiFuture<'_, ()> {
        let request = self
            .client
            .delete(self.todos_url())
            .json(&json!({ "id": id }));
        Box::pin(async move {
            Self::send(request).await?;
            Ok(())
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn toggle_body_carries_only_the_flag() {
        let body = update_body(&UpdateRequest::toggle(TaskId::new(1), true));
        assert_eq!(body, json!({ "id": 1, "completed": true }));
    }

    #[test]
    fn edit_body_sends_null_to_clear_deadline() {
        let cleared = update_body(&UpdateRequest::edit(TaskId::new(2), "Read".to_string(), None));
        assert_eq!(cleared, json!({ "id": 2, "title": "Read", "deadline": null }));

        let deadline = Utc.with_ymd_and_hms(2025, 1, 2, 10, 0, 0).unwrap();
        let set = update_body(&UpdateRequest::edit(TaskId::new(2), "Read".to_string(), Some(deadline)));
        assert_eq!(set["deadline"], json!("2025-01-02T10:00:00Z"));
    }

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let api = HttpTodoApi::new("http://localhost:3000/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(api.todos_url(), "http://localhost:3000/api/todos");
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        let api = HttpTodoApi::new("http://127.0.0.1:9/api", Duration::from_secs(2)).unwrap();
        let result = api.list(ListQuery::default()).await;
        assert!(matches!(result, Err(ApiError::Transport(_))));
    }
}
