//! In-memory todo store
//!
//! [`InMemoryTodoStore`] keeps tasks in a `HashMap` behind a
//! `tokio::sync::RwLock`. It backs the router tests and is the server's
//! store when no database is configured.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tasklist_core::todo::{ListQuery, NewTask, Task, TaskId, TaskPatch};
use tasklist_core::todo_store::{StoreFuture, TodoStore, TodoStoreError};
use tasklist_core::{DateTime, Utc};
use tasklist_runtime::metrics::TodoStoreMetrics;
use tokio::sync::RwLock;

#[derive(Debug)]
struct Table {
    tasks: HashMap<TaskId, Task>,
    next_id: i64,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            tasks: HashMap::new(),
            next_id: 1,
        }
    }
}

/// In-memory todo store for fast, deterministic tests.
///
/// Clones share the same table.
///
/// # Example
///
/// ```
/// use tasklist_testing::InMemoryTodoStore;
/// use tasklist_core::todo::{ListQuery, NewTask};
/// use tasklist_core::todo_store::TodoStore;
/// use tasklist_core::Utc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = InMemoryTodoStore::new();
/// store.create(NewTask::new("Buy milk", None)?, Utc::now()).await?;
///
/// let all = store.list(ListQuery::default()).await?;
/// assert_eq!(all.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryTodoStore {
    table: Arc<RwLock<Table>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryTodoStore {
    /// Create a new empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with a database error (or recover)
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of stored tasks
    pub async fn len(&self) -> usize {
        self.table.read().await.tasks.len()
    }

    /// Whether the store holds no tasks
    pub async fn is_empty(&self) -> bool {
        self.table.read().await.tasks.is_empty()
    }

    /// Fetch a task by id
    pub async fn get(&self, id: TaskId) -> Option<Task> {
        self.table.read().await.tasks.get(&id).cloned()
    }

    fn check_available(&self, operation: &'static str) -> Result<(), TodoStoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            TodoStoreMetrics::record_error(operation);
            return Err(TodoStoreError::DatabaseError(
                "in-memory store marked unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

impl TodoStore for InMemoryTodoStore {
    fn list(&self, query: ListQuery) -> StoreFuture<'_, Vec<Task>> {
        Box::pin(async move {
            self.check_available("list")?;
            let start = Instant::now();

            let table = self.table.read().await;
            let tasks = query.apply(table.tasks.values());

            TodoStoreMetrics::record_operation("list", start.elapsed());
            TodoStoreMetrics::record_listed(tasks.len());
            Ok(tasks)
        })
    }

    fn create(&self, new_task: NewTask, created_at: DateTime<Utc>) -> StoreFuture<'_, Task> {
        Box::pin(async move {
            self.check_available("create")?;
            let start = Instant::now();

            let mut table = self.table.write().await;
            let id = TaskId::new(table.next_id);
            table.next_id += 1;

            let task = Task::new(id, new_task, created_at);
            table.tasks.insert(id, task.clone());

            TodoStoreMetrics::record_operation("create", start.elapsed());
            Ok(task)
        })
    }

    fn update(&self, id: TaskId, patch: TaskPatch) -> StoreFuture<'_, Task> {
        Box::pin(async move {
            self.check_available("update")?;
            patch.validate()?;
            let start = Instant::now();

            let mut table = self.table.write().await;
            let task = table.tasks.get_mut(&id).ok_or(TodoStoreError::NotFound(id))?;
            patch.apply(task);
            let updated = task.clone();

            TodoStoreMetrics::record_operation("update", start.elapsed());
            Ok(updated)
        })
    }

    fn delete(&self, id: TaskId) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            self.check_available("delete")?;
            let start = Instant::now();

            let mut table = self.table.write().await;
            table
                .tasks
                .remove(&id)
                .ok_or(TodoStoreError::NotFound(id))?;

            TodoStoreMetrics::record_operation("delete", start.elapsed());
            Ok(())
        })
    }

    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(async move { self.check_available("ping") })
    }
}
