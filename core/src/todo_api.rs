//! Client-side boundary to the todo HTTP API.
//!
//! The UI view model talks to the server only through [`TodoApi`], so tests
//! can substitute a scripted implementation.

use crate::todo::{ListQuery, Task, TaskId};
use chrono::{DateTime, Utc};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Boxed future returned by [`TodoApi`] methods
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send + 'a>>;

/// Errors surfaced by an API call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The server answered with a non-success status.
    #[error("Request failed with status {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Server-provided message, if any
        message: String,
    },

    /// The request never produced a response.
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Body of an update call.
///
/// `deadline: Some(None)` clears the deadline on the server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdateRequest {
    /// Task to update
    pub id: TaskId,
    /// New title
    pub title: Option<String>,
    /// New completion flag
    pub completed: Option<bool>,
    /// New deadline, or `Some(None)` to clear
    pub deadline: Option<Option<DateTime<Utc>>>,
}

impl UpdateRequest {
    /// Update that only sets the completion flag
    #[must_use]
    pub const fn toggle(id: TaskId, completed: bool) -> Self {
        Self {
            id,
            title: None,
            completed: Some(completed),
            deadline: None,
        }
    }

    /// Update that rewrites title and deadline
    #[must_use]
    pub const fn edit(id: TaskId, title: String, deadline: Option<DateTime<Utc>>) -> Self {
        Self {
            id,
            title: Some(title),
            completed: None,
            deadline: Some(deadline),
        }
    }
}

/// The four operations the UI issues against the server.
pub trait TodoApi: Send + Sync {
    /// Lists tasks for the given filter and sort
    ///
    /// # Errors
    ///
    /// Any non-success response or transport failure.
    fn list(&self, query: ListQuery) -> ApiFuture<'_, Vec<Task>>;

    /// Creates a task
    ///
    /// # Errors
    ///
    /// Any non-success response or transport failure.
    fn create(&self, title: String, deadline: Option<DateTime<Utc>>) -> ApiFuture<'_, Task>;

    /// Applies a partial update
    ///
    /// # Errors
    ///
    /// Any non-success response or transport failure.
    fn update(&self, request: UpdateRequest) -> ApiFuture<'_, Task>;

    /// Deletes a task
    ///
    /// # Errors
    ///
    /// Any non-success response or transport failure.
    fn delete(&self, id: TaskId) -> ApiFuture<'_, ()>;
}
