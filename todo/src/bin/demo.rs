//! To-do list demo
//!
//! Drives the list view model against a running `todo-server` through the
//! HTTP client and prints the rows after each step:
//! - Add two tasks, one with a deadline
//! - Toggle, filter and sort
//! - Edit a title and clear a deadline
//! - Delete a task
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin todo-server &
//! cargo run --bin todo-demo
//! ```

use std::sync::Arc;
use std::time::Duration;
use tasklist_core::environment::{Clock, SystemClock};
use tasklist_core::todo::{Filter, Sort, TaskId};
use tasklist_runtime::Store;
use todo::Config;
use todo::ui::{HttpTodoApi, ListAction, ListEnvironment, ListReducer, ListState, render_rows, rows};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type ListStore = Store<ListState, ListAction, ListEnvironment, ListReducer>;

const WAIT: Duration = Duration::from_secs(10);

/// A reload finished, or the mutation before it failed
fn settled(action: &ListAction) -> bool {
    action.is_load_result()
        || matches!(
            action,
            ListAction::AddFailed { .. } | ListAction::EditFailed { .. } | ListAction::DeleteFailed { .. }
        )
}

/// Sends `action` and waits until the list settles from the reload it triggers
async fn send_and_reload(store: &ListStore, action: ListAction) -> Result<(), Box<dyn std::error::Error>> {
    store.send_and_wait_for(action, settled, WAIT).await?;
    Ok(())
}

async fn print_rows(store: &ListStore, heading: &str) {
    let now = SystemClock.now();
    let (text, error) = store
        .state(|state| (render_rows(&rows(state, now)), state.last_error.clone()))
        .await;
    println!("--- {heading} ---");
    print!("{text}");
    if let Some(error) = error {
        println!("(error: {error})");
    }
    println!();
}

async fn first_id(store: &ListStore) -> Option<TaskId> {
    store.state(|state| state.tasks.first().map(|task| task.id)).await
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,todo=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    println!("Using todo API at {}\n", config.client.base_url);

    let api = HttpTodoApi::from_config(&config.client)?;
    let env = ListEnvironment::new(Arc::new(api), Arc::new(SystemClock));
    let store = Store::new(ListState::new(), ListReducer::new(), env);

    send_and_reload(&store, ListAction::Mounted).await?;
    if let Some(error) = store.state(|state| state.load_error.clone()).await {
        println!("{error} (is todo-server running?)");
        return Ok(());
    }
    print_rows(&store, "Loaded").await;

    // Add
    store
        .send(ListAction::NewTitleChanged { title: "Buy milk".to_string() })
        .await?;
    send_and_reload(&store, ListAction::AddRequested).await?;

    let tomorrow = (SystemClock.now() + chrono::Duration::hours(20))
        .format("%Y-%m-%dT%H:%M")
        .to_string();
    store
        .send(ListAction::NewTitleChanged { title: "File taxes".to_string() })
        .await?;
    store
        .send(ListAction::NewDeadlineChanged { deadline: tomorrow })
        .await?;
    send_and_reload(&store, ListAction::AddRequested).await?;
    print_rows(&store, "After adding two tasks").await;

    // Toggle
    if let Some(id) = first_id(&store).await {
        store
            .send_and_wait_for(
                ListAction::ToggleRequested { id },
                |action| {
                    matches!(
                        action,
                        ListAction::ToggleConfirmed { .. } | ListAction::ToggleFailed { .. }
                    )
                },
                WAIT,
            )
            .await?;
        print_rows(&store, "After toggling the newest task").await;
    }

    // Filter and sort
    send_and_reload(&store, ListAction::FilterChanged { filter: Filter::Active }).await?;
    print_rows(&store, "Active only").await;
    send_and_reload(&store, ListAction::FilterChanged { filter: Filter::All }).await?;
    send_and_reload(&store, ListAction::SortChanged { sort: Sort::Deadline }).await?;
    print_rows(&store, "All, by deadline").await;

    // Edit
    if let Some(id) = first_id(&store).await {
        store.send(ListAction::EditStarted { id }).await?;
        store
            .send(ListAction::EditTitleChanged { title: "File taxes (federal)".to_string() })
            .await?;
        store
            .send(ListAction::EditDeadlineChanged { deadline: String::new() })
            .await?;
        send_and_reload(&store, ListAction::SaveEditRequested).await?;
        print_rows(&store, "After editing").await;
    }

    // Delete
    if let Some(id) = first_id(&store).await {
        send_and_reload(&store, ListAction::DeleteRequested { id }).await?;
        print_rows(&store, "After deleting").await;
    }

    store.shutdown(WAIT).await?;
    Ok(())
}
