//! # Tasklist Runtime
//!
//! Runs reducers built on `tasklist-core`: the [`Store`] owns the state,
//! dispatches actions to the reducer and executes the effects it returns,
//! feeding each resulting action back in.
//!
//! Also home to the health types served by the readiness endpoint and the
//! Prometheus [`metrics`].
//!
//! ## Example
//!
//! ```ignore
//! use tasklist_runtime::Store;
//!
//! let store = Store::new(ListState::new(), ListReducer::new(), environment);
//!
//! store.send(ListAction::Mounted).await?.wait().await;
//! let shown = store.state(|s| s.tasks.len()).await;
//! ```

mod error;
mod handle;
mod health;
mod store;

/// Prometheus metrics for observability
pub mod metrics;

pub use error::StoreError;
pub use handle::EffectHandle;
pub use health::{HealthCheck, HealthReport, HealthStatus};
pub use store::Store;
