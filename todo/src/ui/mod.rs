//! View model of the to-do list screen.
//!
//! [`ListState`] is owned by a `tasklist_runtime::Store` and changed only
//! through [`ListAction`]s reduced by [`ListReducer`]; server calls go
//! through a [`TodoApi`] injected via [`ListEnvironment`].

pub mod client;
pub mod reducer;
pub mod row;
pub mod types;

pub use client::{ApiError, HttpTodoApi, TodoApi, UpdateRequest};
pub use reducer::{ListEnvironment, ListReducer};
pub use row::{TodoRow, render_rows, rows};
pub use types::{EditDraft, LOAD_ERROR_MESSAGE, ListAction, ListState, PendingToggle};
