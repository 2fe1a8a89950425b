//! To-do list server
//!
//! Serves the `/api/todos` API plus health and metrics endpoints.
//!
//! Uses `PostgreSQL` when `DATABASE_URL` is set (running migrations on
//! startup), otherwise keeps tasks in memory.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin todo-server
//! ```

use std::sync::Arc;
use tasklist_core::environment::SystemClock;
use tasklist_core::todo_store::TodoStore;
use tasklist_postgres::PostgresTodoStore;
use tasklist_runtime::metrics::MetricsServer;
use tasklist_testing::InMemoryTodoStore;
use todo::{AppState, Config, build_router};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todo=info,tasklist_web=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let addr = config.server.bind_address()?;
    tracing::info!(
        %addr,
        persistent = config.database.is_some(),
        "Configuration loaded"
    );

    let mut metrics = MetricsServer::new();
    metrics.start()?;

    let store: Arc<dyn TodoStore> = if let Some(database) = &config.database {
        let store = PostgresTodoStore::connect(
            &database.url,
            database.max_connections,
            database.connect_timeout(),
        )
        .await?;
        store.migrate().await?;
        tracing::info!("Using PostgreSQL todo store");
        Arc::new(store)
    } else {
        tracing::warn!("DATABASE_URL not set, tasks are kept in memory only");
        Arc::new(InMemoryTodoStore::new())
    };

    let state = AppState::new(store, Arc::new(SystemClock), metrics);
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Todo server listening");

    let (shutdown_tx, mut shutdown_rx) = tokio::sync::watch::channel(false);
    let server = axum::serve(listener, router).with_graceful_shutdown(async move {
        let _ = shutdown_rx.changed().await;
    });
    let handle = tokio::spawn(async move { server.await });

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down gracefully...");
    let _ = shutdown_tx.send(true);

    match tokio::time::timeout(config.server.shutdown_timeout(), handle).await {
        Ok(joined) => joined??,
        Err(_) => tracing::warn!(
            timeout_secs = config.server.shutdown_timeout,
            "In-flight requests did not finish before the shutdown timeout"
        ),
    }

    tracing::info!("Server stopped");
    Ok(())
}
