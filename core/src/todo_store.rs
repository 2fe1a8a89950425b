//! Todo store trait and related types.
//!
//! The store owns durable task storage and executes list queries. It assigns
//! ids, keeps `created_at` immutable and never persists an empty title.
//!
//! # Implementations
//!
//! - `PostgresTodoStore` (in `tasklist-postgres`): production storage
//! - `InMemoryTodoStore` (in `tasklist-testing`): tests and database-less runs
//!
//! # Example
//!
//! ```no_run
//! use tasklist_core::todo::{Filter, ListQuery, NewTask, Sort, TaskPatch};
//! use tasklist_core::todo_store::{TodoStore, TodoStoreError};
//! use tasklist_core::Utc;
//!
//! async fn example<S: TodoStore>(store: &S) -> Result<(), TodoStoreError> {
//!     let created = store
//!         .create(NewTask::new("Buy milk", None)?, Utc::now())
//!         .await?;
//!
//!     store
//!         .update(created.id, TaskPatch::new().with_completed(true))
//!         .await?;
//!
//!     let done = store
//!         .list(ListQuery::new(Filter::Completed, Sort::Newest))
//!         .await?;
//!     assert_eq!(done.len(), 1);
//!
//!     store.delete(created.id).await
//! }
//! ```

use crate::todo::{ListQuery, NewTask, Task, TaskId, TaskPatch, TaskValidationError};
use chrono::{DateTime, Utc};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Boxed future returned by [`TodoStore`] methods
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, TodoStoreError>> + Send + 'a>>;

/// Errors that can occur during todo store operations.
#[derive(Error, Debug)]
pub enum TodoStoreError {
    /// No task with the given id exists.
    #[error("Todo not found: {0}")]
    NotFound(TaskId),

    /// Input rejected before reaching storage.
    #[error(transparent)]
    Validation(#[from] TaskValidationError),

    /// Database connection or query error.
    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Task persistence.
///
/// # Dyn Compatibility
///
/// Methods return boxed futures so the server can hold an
/// `Arc<dyn TodoStore>` and pick the backend at startup.
pub trait TodoStore: Send + Sync {
    /// Returns every task matching `query.filter`, ordered by `query.sort`.
    ///
    /// Tasks without a deadline always come last under [`Sort::Deadline`].
    ///
    /// # Errors
    ///
    /// - `DatabaseError`: storage failure
    ///
    /// [`Sort::Deadline`]: crate::todo::Sort::Deadline
    fn list(&self, query: ListQuery) -> StoreFuture<'_, Vec<Task>>;

    /// Persists a new task with `completed = false`.
    ///
    /// # Errors
    ///
    /// - `DatabaseError`: storage failure
    fn create(&self, new_task: NewTask, created_at: DateTime<Utc>) -> StoreFuture<'_, Task>;

    /// Applies a partial patch; absent fields are left untouched.
    ///
    /// # Errors
    ///
    /// - `NotFound`: unknown id
    /// - `Validation`: the patch carries an empty title
    /// - `DatabaseError`: storage failure
    fn update(&self, id: TaskId, patch: TaskPatch) -> StoreFuture<'_, Task>;

    /// Permanently removes a task.
    ///
    /// # Errors
    ///
    /// - `NotFound`: unknown id (nothing is removed)
    /// - `DatabaseError`: storage failure
    fn delete(&self, id: TaskId) -> StoreFuture<'_, ()>;

    /// Checks that the backing storage is reachable.
    ///
    /// # Errors
    ///
    /// - `DatabaseError`: storage is unreachable
    fn ping(&self) -> StoreFuture<'_, ()>;
}
