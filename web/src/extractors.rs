//! Custom Axum extractors.
//!
//! # Examples
//!
//! ```ignore
//! use tasklist_web::extractors::CorrelationId;
//!
//! async fn handler(correlation_id: CorrelationId) -> Result<Json<Vec<Task>>, AppError> {
//!     tracing::info!(correlation_id = %correlation_id.0, "Listing todos");
//!     Ok(Json(tasks))
//! }
//! ```

use crate::middleware::CORRELATION_ID_HEADER;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

/// Correlation ID for request tracing.
///
/// Uses the id stored by [`tag_correlation_id`](crate::tag_correlation_id)
/// when the middleware is installed, so the handler logs the same id the response
/// header carries. Otherwise reads the `X-Correlation-ID` header, or
/// generates a new UUID v4.
#[derive(Debug, Clone, Copy)]
pub struct CorrelationId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(id) = parts.extensions.get::<Uuid>() {
            return Ok(Self(*id));
        }

        let correlation_id = parts
            .headers
            .get(CORRELATION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::new_v4);

        Ok(Self(correlation_id))
    }
}
