//! `PostgreSQL` todo store for the tasklist service.
//!
//! This crate provides [`PostgresTodoStore`], the production implementation of
//! the `TodoStore` trait from `tasklist-core`. It uses sqlx runtime queries
//! over a connection pool and ships the `todos` table as a sqlx migration.
//!
//! # Example
//!
//! ```ignore
//! use tasklist_postgres::PostgresTodoStore;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = PostgresTodoStore::connect("postgres://localhost/todos", 10, Duration::from_secs(30)).await?;
//!     store.migrate().await?;
//!     Ok(())
//! }
//! ```

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::{Duration, Instant};
use tasklist_core::todo::{ListQuery, NewTask, Sort, Task, TaskId, TaskPatch};
use tasklist_core::todo_store::{StoreFuture, TodoStore, TodoStoreError};
use tasklist_runtime::metrics::TodoStoreMetrics;

const COLUMNS: &str = "id, title, completed, deadline, created_at";

/// Row shape of the `todos` table
#[derive(sqlx::FromRow)]
struct TodoRow {
    id: i64,
    title: String,
    completed: bool,
    deadline: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<TodoRow> for Task {
    fn from(row: TodoRow) -> Self {
        Self {
            id: TaskId::new(row.id),
            title: row.title,
            completed: row.completed,
            deadline: row.deadline,
            created_at: row.created_at,
        }
    }
}

/// `ORDER BY` clause for a sort key; null deadlines always sort last
const fn order_by(sort: Sort) -> &'static str {
    match sort {
        Sort::Newest => "created_at DESC, id DESC",
        Sort::Deadline => "deadline ASC NULLS LAST, created_at DESC, id DESC",
    }
}

fn database_error(operation: &'static str, error: &sqlx::Error) -> TodoStoreError {
    TodoStoreMetrics::record_error(operation);
    tracing::error!(operation, error = %error, "todo store query failed");
    TodoStoreError::DatabaseError(format!("Failed to {operation}: {error}"))
}

/// PostgreSQL-backed todo store.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE todos (
///     id BIGSERIAL PRIMARY KEY,
///     title TEXT NOT NULL,
///     completed BOOLEAN NOT NULL DEFAULT FALSE,
///     deadline TIMESTAMPTZ NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT now()
/// );
/// ```
#[derive(Clone, Debug)]
pub struct PostgresTodoStore {
    pool: PgPool,
}

impl PostgresTodoStore {
    /// Create a store over an existing connection pool.
    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect a new pool.
    ///
    /// # Errors
    ///
    /// Returns [`TodoStoreError::DatabaseError`] if the connection fails.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        connect_timeout: Duration,
    ) -> Result<Self, TodoStoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(connect_timeout)
            .connect(database_url)
            .await
            .map_err(|e| TodoStoreError::DatabaseError(format!("Failed to connect: {e}")))?;

        Ok(Self::from_pool(pool))
    }

    /// Run the bundled migrations (creates the `todos` table).
    ///
    /// # Errors
    ///
    /// Returns [`TodoStoreError::DatabaseError`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), TodoStoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| TodoStoreError::DatabaseError(format!("Migration failed: {e}")))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl TodoStore for PostgresTodoStore {
    fn list(&self, query: ListQuery) -> StoreFuture<'_, Vec<Task>> {
        Box::pin(async move {
            let start = Instant::now();
            let sql = format!(
                "SELECT {COLUMNS} FROM todos \
                 WHERE ($1::BOOLEAN IS NULL OR completed = $1) \
                 ORDER BY {}",
                order_by(query.sort)
            );

            let rows: Vec<TodoRow> = sqlx::query_as(&sql)
                .bind(query.filter.completed())
                .fetch_all(&self.pool)
                .await
                .map_err(|e| database_error("list", &e))?;

            TodoStoreMetrics::record_operation("list", start.elapsed());
            TodoStoreMetrics::record_listed(rows.len());
            tracing::debug!(filter = %query.filter, sort = %query.sort, count = rows.len(), "listed todos");

            Ok(rows.into_iter().map(Task::from).collect())
        })
    }

    fn create(&self, new_task: NewTask, created_at: DateTime<Utc>) -> StoreFuture<'_, Task> {
        Box::pin(async move {
            let start = Instant::now();
            let sql = format!(
                "INSERT INTO todos (title, completed, deadline, created_at) \
                 VALUES ($1, FALSE, $2, $3) \
                 RETURNING {COLUMNS}"
            );

            let row: TodoRow = sqlx::query_as(&sql)
                .bind(&new_task.title)
                .bind(new_task.deadline)
                .bind(created_at)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| database_error("create", &e))?;

            TodoStoreMetrics::record_operation("create", start.elapsed());
            tracing::info!(id = row.id, "created todo");

            Ok(row.into())
        })
    }

    fn update(&self, id: TaskId, patch: TaskPatch) -> StoreFuture<'_, Task> {
        Box::pin(async move {
            patch.validate()?;
            let start = Instant::now();
            let sql = format!(
                "UPDATE todos SET \
                     title = COALESCE($2, title), \
                     completed = COALESCE($3, completed), \
                     deadline = CASE WHEN $4 THEN $5 ELSE deadline END \
                 WHERE id = $1 \
                 RETURNING {COLUMNS}"
            );

            let row: Option<TodoRow> = sqlx::query_as(&sql)
                .bind(id.get())
                .bind(patch.title.as_deref())
                .bind(patch.completed)
                .bind(patch.deadline.is_some())
                .bind(patch.deadline.flatten())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| database_error("update", &e))?;

            TodoStoreMetrics::record_operation("update", start.elapsed());
            let row = row.ok_or(TodoStoreError::NotFound(id))?;
            tracing::info!(id = row.id, "updated todo");

            Ok(row.into())
        })
    }

    fn delete(&self, id: TaskId) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let start = Instant::now();

            let result = sqlx::query("DELETE FROM todos WHERE id = $1")
                .bind(id.get())
                .execute(&self.pool)
                .await
                .map_err(|e| database_error("delete", &e))?;

            TodoStoreMetrics::record_operation("delete", start.elapsed());
            if result.rows_affected() == 0 {
                return Err(TodoStoreError::NotFound(id));
            }
            tracing::info!(%id, "deleted todo");

            Ok(())
        })
    }

    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            sqlx::query("SELECT 1")
                .execute(&self.pool)
                .await
                .map_err(|e| database_error("ping", &e))?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadline_ordering_puts_nulls_last() {
        assert!(order_by(Sort::Deadline).starts_with("deadline ASC NULLS LAST"));
        assert!(order_by(Sort::Newest).starts_with("created_at DESC"));
    }
}
