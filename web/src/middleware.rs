//! Correlation ids for the todo API.
//!
//! [`tag_correlation_id`] runs as an axum `from_fn` middleware. It keeps the
//! caller's `X-Correlation-ID` when that is a UUID and mints one otherwise,
//! then runs the request inside an `http_request` span and echoes the id on
//! the response.
//!
//! ```ignore
//! let app = Router::new()
//!     .route("/api/todos", get(list_todos))
//!     .layer(axum::middleware::from_fn(tag_correlation_id));
//! ```

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Instrument;
use uuid::Uuid;

/// Header name for correlation ID.
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-ID";

fn requested_id(request: &Request) -> Option<Uuid> {
    request
        .headers()
        .get(CORRELATION_ID_HEADER)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

/// Tag the request with its correlation id; handlers read it back through
/// the [`CorrelationId`](crate::CorrelationId) extractor.
pub async fn tag_correlation_id(mut request: Request, next: Next) -> Response {
    let correlation_id = requested_id(&request).unwrap_or_else(Uuid::new_v4);
    request.extensions_mut().insert(correlation_id);

    let span = tracing::info_span!(
        "http_request",
        %correlation_id,
        method = %request.method(),
        uri = %request.uri(),
    );
    let mut response = next.run(request).instrument(span).await;

    if let Ok(value) = HeaderValue::from_str(&correlation_id.to_string()) {
        response.headers_mut().insert(CORRELATION_ID_HEADER, value);
    }
    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::CorrelationId;
    use axum::{Router, body::Body, middleware, routing::get};
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route("/todos", get(|id: CorrelationId| async move { id.0.to_string() }))
            .layer(middleware::from_fn(tag_correlation_id))
    }

    async fn echoed(header: Option<&str>) -> (String, String) {
        let mut request = Request::builder().uri("/todos");
        if let Some(value) = header {
            request = request.header(CORRELATION_ID_HEADER, value);
        }
        let response = app()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();

        let header = response.headers()[CORRELATION_ID_HEADER]
            .to_str()
            .unwrap()
            .to_string();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (header, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn caller_id_reaches_handler_and_response() {
        let id = "6f9619ff-8b86-d011-b42d-00c04fc964ff";
        assert_eq!(echoed(Some(id)).await, (id.to_string(), id.to_string()));
    }

    #[tokio::test]
    async fn missing_or_malformed_id_is_replaced() {
        for header in [None, Some("not-a-uuid")] {
            let (echoed_header, seen_by_handler) = echoed(header).await;
            assert!(echoed_header.parse::<Uuid>().is_ok());
            assert_eq!(echoed_header, seen_by_handler);
        }
    }
}
