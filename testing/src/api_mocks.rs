//! Scriptable [`TodoApi`] for view-model tests
//!
//! [`MockTodoApi`] serves calls from an [`InMemoryTodoStore`] and lets a test
//! queue failures and delays per operation, so out-of-order responses and
//! rollbacks can be reproduced deterministically.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Panics only on a poisoned script lock

use crate::store_mocks::InMemoryTodoStore;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tasklist_core::todo::{ListQuery, NewTask, Task, TaskId, TaskPatch};
use tasklist_core::todo_api::{ApiError, ApiFuture, TodoApi, UpdateRequest};
use tasklist_core::todo_store::{TodoStore, TodoStoreError};
use tasklist_core::{DateTime, Utc};

/// The four API operations, used to target scripted behavior
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ApiOperation {
    /// `list`
    List,
    /// `create`
    Create,
    /// `update`
    Update,
    /// `delete`
    Delete,
}

/// A call received by the mock, in arrival order
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiCall {
    /// `list(query)`
    List(ListQuery),
    /// `create(title, deadline)`
    Create {
        /// Requested title
        title: String,
        /// Requested deadline
        deadline: Option<DateTime<Utc>>,
    },
    /// `update(request)`
    Update(UpdateRequest),
    /// `delete(id)`
    Delete(TaskId),
}

#[derive(Default)]
struct Script {
    failures: HashMap<ApiOperation, VecDeque<ApiError>>,
    delays: HashMap<ApiOperation, VecDeque<Duration>>,
    calls: Vec<ApiCall>,
}

/// Scriptable in-memory implementation of [`TodoApi`].
///
/// # Example
///
/// ```
/// use tasklist_testing::{ApiOperation, MockTodoApi};
/// use tasklist_core::todo_api::{ApiError, TodoApi, UpdateRequest};
///
/// # async fn example() {
/// let api = MockTodoApi::new();
/// let task = api.seed("Buy milk", None).await;
///
/// api.fail_next(ApiOperation::Update, ApiError::Status { status: 500, message: "boom".into() });
/// assert!(api.update(UpdateRequest::toggle(task.id, true)).await.is_err());
/// # }
/// ```
#[derive(Clone)]
pub struct MockTodoApi {
    store: InMemoryTodoStore,
    script: Arc<Mutex<Script>>,
    base_time: DateTime<Utc>,
    created: Arc<AtomicI64>,
}

impl MockTodoApi {
    /// Create an empty mock; creation times start at the test clock's instant
    #[must_use]
    pub fn new() -> Self {
        use tasklist_core::environment::Clock;

        Self {
            store: InMemoryTodoStore::new(),
            script: Arc::new(Mutex::new(Script::default())),
            base_time: crate::test_clock().now(),
            created: Arc::new(AtomicI64::new(0)),
        }
    }

    /// Backing store, for direct assertions
    #[must_use]
    pub const fn store(&self) -> &InMemoryTodoStore {
        &self.store
    }

    /// Insert a task directly, bypassing the script and call log
    pub async fn seed(&self, title: &str, deadline: Option<DateTime<Utc>>) -> Task {
        let new_task = NewTask::new(title, deadline).unwrap();
        self.store
            .create(new_task, self.next_created_at())
            .await
            .unwrap()
    }

    /// Make the next call to `operation` fail with `error`
    pub fn fail_next(&self, operation: ApiOperation, error: ApiError) {
        self.script
            .lock()
            .unwrap()
            .failures
            .entry(operation)
            .or_default()
            .push_back(error);
    }

    /// Delay the response of the next call to `operation`
    pub fn delay_next(&self, operation: ApiOperation, delay: Duration) {
        self.script
            .lock()
            .unwrap()
            .delays
            .entry(operation)
            .or_default()
            .push_back(delay);
    }

    /// Every call received so far
    #[must_use]
    pub fn calls(&self) -> Vec<ApiCall> {
        self.script.lock().unwrap().calls.clone()
    }

    /// Number of calls received for one operation
    #[must_use]
    pub fn call_count(&self, operation: ApiOperation) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.operation() == operation)
            .count()
    }

    fn next_created_at(&self) -> DateTime<Utc> {
        let n = self.created.fetch_add(1, Ordering::SeqCst);
        self.base_time + chrono::Duration::seconds(n)
    }

    /// Logs the call and pops any scripted delay and failure for it
    fn begin(&self, call: ApiCall) -> (Option<Duration>, Option<ApiError>) {
        let operation = call.operation();
        let mut script = self.script.lock().unwrap();
        script.calls.push(call);
        let delay = script
            .delays
            .get_mut(&operation)
            .and_then(VecDeque::pop_front);
        let failure = script
            .failures
            .get_mut(&operation)
            .and_then(VecDeque::pop_front);
        (delay, failure)
    }

    async fn respond<T>(
        &self,
        call: ApiCall,
        serve: impl std::future::Future<Output = Result<T, TodoStoreError>>,
    ) -> Result<T, ApiError> {
        let (delay, failure) = self.begin(call);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = failure {
            return Err(error);
        }
        serve.await.map_err(status_error)
    }
}

impl Default for MockTodoApi {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiCall {
    /// Operation this call belongs to
    #[must_use]
    pub const fn operation(&self) -> ApiOperation {
        match self {
            Self::List(_) => ApiOperation::List,
            Self::Create { .. } => ApiOperation::Create,
            Self::Update(_) => ApiOperation::Update,
            Self::Delete(_) => ApiOperation::Delete,
        }
    }
}

/// Maps store errors to the statuses the HTTP API would answer with
fn status_error(error: TodoStoreError) -> ApiError {
    let status = match &error {
        TodoStoreError::NotFound(_) => 404,
        TodoStoreError::Validation(_) => 400,
        TodoStoreError::DatabaseError(_) => 500,
    };
    ApiError::Status {
        status,
        message: error.to_string(),
    }
}

impl TodoApi for MockTodoApi {
    fn list(&self, query: ListQuery) -> ApiFuture<'_, Vec<Task>> {
        Box::pin(self.respond(ApiCall::List(query), self.store.list(query)))
    }

    fn create(&self, title: String, deadline: Option<DateTime<Utc>>) -> ApiFuture<'_, Task> {
        let call = ApiCall::Create {
            title: title.clone(),
            deadline,
        };
        Box::pin(async move {
            let created_at = self.next_created_at();
            let serve = async move {
                match NewTask::new(title, deadline) {
                    Ok(new_task) => self.store.create(new_task, created_at).await,
                    Err(error) => Err(TodoStoreError::from(error)),
                }
            };
            self.respond(call, serve).await
        })
    }

    fn update(&self, request: UpdateRequest) -> ApiFuture<'_, Task> {
        let patch = TaskPatch {
            title: request.title.clone(),
            completed: request.completed,
            deadline: request.deadline,
        };
        let id = request.id;
        Box::pin(self.respond(ApiCall::Update(request), self.store.update(id, patch)))
    }

    fn delete(&self, id: TaskId) -> ApiFuture<'_, ()> {
        Box::pin(self.respond(ApiCall::Delete(id), self.store.delete(id)))
    }
}
