//! List view model running in the `Store` runtime against a scripted API.

#![allow(clippy::unwrap_used)]

use chrono::{TimeZone, Utc};
use std::sync::Arc;
use std::time::Duration;
use tasklist_core::todo::{Filter, TaskId};
use tasklist_core::todo_api::ApiError;
use tasklist_runtime::Store;
use tasklist_testing::{ApiOperation, MockTodoApi, test_clock};
use todo::ui::{ListAction, ListEnvironment, ListReducer, ListState};
use tokio_test::assert_ok;

type ListStore = Store<ListState, ListAction, ListEnvironment, ListReducer>;

fn list_store(api: &MockTodoApi) -> ListStore {
    let env = ListEnvironment::new(Arc::new(api.clone()), Arc::new(test_clock()));
    Store::new(ListState::new(), ListReducer::new(), env)
}

/// Polls the state until `predicate` holds
async fn wait_until<F>(store: &ListStore, predicate: F)
where
    F: Fn(&ListState) -> bool,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if store.state(|state| predicate(state)).await {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();
}

async fn mounted(api: &MockTodoApi) -> ListStore {
    let store = list_store(api);
    store.send(ListAction::Mounted).await.unwrap();
    wait_until(&store, |state| !state.loading).await;
    store
}

fn server_error() -> ApiError {
    ApiError::Status {
        status: 500,
        message: "boom".to_string(),
    }
}

#[tokio::test]
async fn failed_toggle_restores_previous_view() {
    let api = MockTodoApi::new();
    let task = api.seed("Buy milk", None).await;
    let store = mounted(&api).await;

    api.delay_next(ApiOperation::Update, Duration::from_millis(50));
    api.fail_next(ApiOperation::Update, server_error());

    let mut handle = store
        .send(ListAction::ToggleRequested { id: task.id })
        .await
        .unwrap();
    assert!(store.state(|state| state.tasks[0].completed).await);

    handle.wait().await;

    let (completed, error) = store
        .state(|state| (state.tasks[0].completed, state.last_error.clone()))
        .await;
    assert!(!completed);
    assert!(error.is_some());
    assert!(!api.store().get(task.id).await.unwrap().completed);
}

#[tokio::test]
async fn created_task_moves_between_filters_when_toggled() {
    let api = MockTodoApi::new();
    let store = mounted(&api).await;

    store
        .send(ListAction::NewTitleChanged { title: "Buy milk".to_string() })
        .await
        .unwrap();
    store.send(ListAction::AddRequested).await.unwrap();
    wait_until(&store, |state| state.tasks.len() == 1 && !state.loading).await;

    let (id, deadline, completed) = store
        .state(|state| (state.tasks[0].id, state.tasks[0].deadline, state.tasks[0].completed))
        .await;
    assert_eq!(deadline, None);
    assert!(!completed);

    store
        .send(ListAction::FilterChanged { filter: Filter::Completed })
        .await
        .unwrap();
    wait_until(&store, |state| !state.loading).await;
    assert!(store.state(|state| state.tasks.is_empty()).await);

    store
        .send(ListAction::FilterChanged { filter: Filter::All })
        .await
        .unwrap();
    wait_until(&store, |state| !state.loading).await;
    store
        .send(ListAction::ToggleRequested { id })
        .await
        .unwrap()
        .wait()
        .await;

    store
        .send(ListAction::FilterChanged { filter: Filter::Completed })
        .await
        .unwrap();
    wait_until(&store, |state| !state.loading).await;
    let shown: Vec<TaskId> = store
        .state(|state| state.tasks.iter().map(|task| task.id).collect())
        .await;
    assert_eq!(shown, vec![id]);
}

#[tokio::test]
async fn slow_list_response_does_not_overwrite_newer_one() {
    let api = MockTodoApi::new();
    api.seed("open task", None).await;
    let store = list_store(&api);

    api.delay_next(ApiOperation::List, Duration::from_millis(100));
    let mut slow = store.send(ListAction::Mounted).await.unwrap();
    store
        .send(ListAction::FilterChanged { filter: Filter::Completed })
        .await
        .unwrap();
    wait_until(&store, |state| !state.loading).await;

    slow.wait().await;

    let (filter, count) = store
        .state(|state| (state.filter, state.tasks.len()))
        .await;
    assert_eq!(filter, Filter::Completed);
    assert_eq!(count, 0);
}

#[tokio::test]
async fn superseded_toggle_failure_does_not_roll_back() {
    let api = MockTodoApi::new();
    let task = api.seed("Buy milk", None).await;
    let store = mounted(&api).await;

    api.delay_next(ApiOperation::Update, Duration::from_millis(100));
    api.fail_next(ApiOperation::Update, server_error());

    let toggle = ListAction::ToggleRequested { id: task.id };
    let mut first = store.send(toggle.clone()).await.unwrap();
    store.send(toggle.clone()).await.unwrap().wait().await;
    store.send(toggle).await.unwrap().wait().await;
    first.wait().await;

    let (completed, error, pending) = store
        .state(|state| {
            (
                state.tasks[0].completed,
                state.last_error.clone(),
                state.is_toggle_pending(task.id),
            )
        })
        .await;
    assert!(completed);
    assert_eq!(error, None);
    assert!(!pending);
    assert!(api.store().get(task.id).await.unwrap().completed);
}

#[tokio::test]
async fn two_failed_toggles_show_what_the_server_has() {
    let api = MockTodoApi::new();
    let task = api.seed("Buy milk", None).await;
    let store = mounted(&api).await;

    api.delay_next(ApiOperation::Update, Duration::from_millis(50));
    api.fail_next(ApiOperation::Update, server_error());
    api.fail_next(ApiOperation::Update, server_error());

    let toggle = ListAction::ToggleRequested { id: task.id };
    let mut first = store.send(toggle.clone()).await.unwrap();
    store.send(toggle).await.unwrap().wait().await;
    assert!(store.state(|state| state.is_toggle_pending(task.id)).await);
    first.wait().await;

    let (completed, error, pending) = store
        .state(|state| {
            (
                state.tasks[0].completed,
                state.last_error.clone(),
                state.is_toggle_pending(task.id),
            )
        })
        .await;
    let server = api.store().get(task.id).await.unwrap();
    assert_eq!(completed, server.completed);
    assert!(!completed);
    assert!(error.is_some());
    assert!(!pending);
    assert_eq!(api.call_count(ApiOperation::Update), 2);
}

#[tokio::test]
async fn edit_saves_title_and_clears_deadline() {
    let api = MockTodoApi::new();
    let deadline = Utc.with_ymd_and_hms(2025, 1, 3, 18, 0, 0).unwrap();
    let task = api.seed("Call mom", Some(deadline)).await;
    let store = mounted(&api).await;

    store.send(ListAction::EditStarted { id: task.id }).await.unwrap();
    assert_eq!(
        store
            .state(|state| state.editing.as_ref().map(|draft| draft.deadline.clone()))
            .await,
        Some("2025-01-03T18:00".to_string())
    );

    store
        .send(ListAction::EditTitleChanged { title: "Call dad".to_string() })
        .await
        .unwrap();
    store
        .send(ListAction::EditDeadlineChanged { deadline: String::new() })
        .await
        .unwrap();
    store.send(ListAction::SaveEditRequested).await.unwrap();
    wait_until(&store, |state| {
        state.editing.is_none() && !state.loading && state.tasks[0].title == "Call dad"
    })
    .await;

    let saved = api.store().get(task.id).await.unwrap();
    assert_eq!(saved.title, "Call dad");
    assert_eq!(saved.deadline, None);
}

#[tokio::test]
async fn failed_delete_is_reported_until_dismissed() {
    let api = MockTodoApi::new();
    let task = api.seed("Buy milk", None).await;
    let store = mounted(&api).await;

    api.fail_next(ApiOperation::Delete, ApiError::Transport("offline".to_string()));
    store
        .send(ListAction::DeleteRequested { id: task.id })
        .await
        .unwrap()
        .wait()
        .await;

    let (count, error) = store
        .state(|state| (state.tasks.len(), state.last_error.clone()))
        .await;
    assert_eq!(count, 1);
    assert!(error.is_some());

    assert_ok!(store.send(ListAction::DismissError).await);
    assert_eq!(store.state(|state| state.last_error.clone()).await, None);
}

#[tokio::test]
async fn delete_reloads_without_the_task() {
    let api = MockTodoApi::new();
    let task = api.seed("Buy milk", None).await;
    api.seed("Walk dog", None).await;
    let store = mounted(&api).await;

    store.send(ListAction::DeleteRequested { id: task.id }).await.unwrap();
    wait_until(&store, |state| state.tasks.len() == 1 && !state.loading).await;

    assert!(store.state(|state| state.task(task.id).is_none()).await);
    assert_eq!(api.call_count(ApiOperation::Delete), 1);
}

#[tokio::test]
async fn load_failure_prompts_retry() {
    let api = MockTodoApi::new();
    api.seed("Buy milk", None).await;
    api.fail_next(ApiOperation::List, ApiError::Transport("offline".to_string()));
    let store = mounted(&api).await;

    assert!(store.state(|state| state.load_error.is_some()).await);

    store.send(ListAction::Retry).await.unwrap();
    wait_until(&store, |state| !state.loading).await;
    let (count, error) = store
        .state(|state| (state.tasks.len(), state.load_error.clone()))
        .await;
    assert_eq!(count, 1);
    assert_eq!(error, None);
}
