//! State and actions of the list view model.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tasklist_core::todo::{Filter, ListQuery, Sort, Task, TaskId};
use tasklist_core::todo_api::ApiError;

/// Message shown when the list cannot be fetched
pub const LOAD_ERROR_MESSAGE: &str = "Could not load tasks. Retry?";

/// In-progress edit of one task
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditDraft {
    /// Task being edited
    pub id: TaskId,
    /// Draft title
    pub title: String,
    /// Draft deadline in `datetime-local` form, empty for none
    pub deadline: String,
}

/// Optimistic toggles on one task whose Update responses are outstanding.
///
/// Consecutive toggles of the same task share one record. When the last
/// response arrives the record settles: if the newest request failed, the
/// task falls back to `confirmed`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingToggle {
    /// Latest toggle token issued for the task
    pub token: u64,
    /// Requests still awaiting a response
    pub in_flight: u32,
    /// What the server holds as far as responses show. Starts as the flag
    /// before the first unconfirmed flip
    pub confirmed: bool,
    /// Token of the newest successful request, 0 while none has succeeded
    pub confirmed_token: u64,
    /// Most recent failure among the requests
    pub failure: Option<ApiError>,
    /// The list exactly as it was before the first unconfirmed flip
    pub snapshot: Vec<Task>,
    /// List revision right after the latest flip
    pub revision: u64,
}

/// State of the to-do list screen
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListState {
    /// Tasks currently shown, in server order
    pub tasks: Vec<Task>,
    /// Draft title of the add form
    pub new_title: String,
    /// Draft deadline of the add form (`datetime-local` form)
    pub new_deadline: String,
    /// Edit mode, at most one task at a time
    pub editing: Option<EditDraft>,
    /// Active completion filter
    pub filter: Filter,
    /// Active ordering
    pub sort: Sort,
    /// A list request is in flight
    pub loading: bool,
    /// Set when the last list request failed
    pub load_error: Option<String>,
    /// Last failed mutation, until dismissed
    pub last_error: Option<String>,
    /// When the shown list was received; reference point for near-deadline
    pub loaded_at: Option<DateTime<Utc>>,
    /// Incremented per list request; older responses are discarded
    pub generation: u64,
    /// Outstanding optimistic toggles by task
    pub pending_toggles: HashMap<TaskId, PendingToggle>,
    /// Last toggle token handed out
    pub toggle_token: u64,
    /// Incremented whenever `tasks` changes
    pub revision: u64,
}

impl ListState {
    /// Creates an empty list state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter and sort the next list request uses
    #[must_use]
    pub const fn query(&self) -> ListQuery {
        ListQuery::new(self.filter, self.sort)
    }

    /// Returns a shown task by ID
    #[must_use]
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Whether an optimistic toggle on `id` is unconfirmed
    #[must_use]
    pub fn is_toggle_pending(&self, id: TaskId) -> bool {
        self.pending_toggles.contains_key(&id)
    }

    /// Replaces the shown tasks and bumps the revision
    pub(crate) fn replace_tasks(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
        self.revision += 1;
    }
}

/// Everything that can happen on the list screen.
///
/// User intents are plain names (`AddRequested`); outcomes of API calls are
/// fed back by effects (`Added`, `AddFailed`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListAction {
    // ========== Loading ==========
    /// Screen shown; triggers the first load
    Mounted,
    /// Completion filter changed
    FilterChanged {
        /// New filter
        filter: Filter,
    },
    /// Ordering changed
    SortChanged {
        /// New ordering
        sort: Sort,
    },
    /// Repeat the list request after a failure
    Retry,
    /// List response
    Loaded {
        /// Generation of the request this answers
        generation: u64,
        /// Tasks returned by the server
        tasks: Vec<Task>,
    },
    /// List request failed
    LoadFailed {
        /// Generation of the request this answers
        generation: u64,
        /// Failure cause
        error: ApiError,
    },

    // ========== Add ==========
    /// Add form title edited
    NewTitleChanged {
        /// Current input
        title: String,
    },
    /// Add form deadline edited
    NewDeadlineChanged {
        /// Current input, `datetime-local` form
        deadline: String,
    },
    /// Add button pressed
    AddRequested,
    /// Create succeeded
    Added {
        /// Created task
        task: Task,
    },
    /// Create failed
    AddFailed {
        /// Failure cause
        error: ApiError,
    },

    // ========== Toggle ==========
    /// Checkbox clicked
    ToggleRequested {
        /// Task to flip
        id: TaskId,
    },
    /// Server accepted a toggle
    ToggleConfirmed {
        /// Toggled task
        id: TaskId,
        /// Token of the toggle this answers
        token: u64,
        /// Flag the server stored
        completed: bool,
    },
    /// Server rejected a toggle, or it never arrived
    ToggleFailed {
        /// Toggled task
        id: TaskId,
        /// Token of the toggle this answers
        token: u64,
        /// Failure cause
        error: ApiError,
    },

    // ========== Edit ==========
    /// Edit button pressed
    EditStarted {
        /// Task to edit
        id: TaskId,
    },
    /// Edit title input changed
    EditTitleChanged {
        /// Current input
        title: String,
    },
    /// Edit deadline input changed
    EditDeadlineChanged {
        /// Current input, `datetime-local` form
        deadline: String,
    },
    /// Leave edit mode without saving
    EditCancelled,
    /// Save button pressed
    SaveEditRequested,
    /// Update succeeded
    EditSaved {
        /// Updated task
        task: Task,
    },
    /// Update failed
    EditFailed {
        /// Failure cause
        error: ApiError,
    },

    // ========== Delete ==========
    /// Delete button pressed
    DeleteRequested {
        /// Task to delete
        id: TaskId,
    },
    /// Delete succeeded
    Deleted {
        /// Deleted task
        id: TaskId,
    },
    /// Delete failed
    DeleteFailed {
        /// Task that was not deleted
        id: TaskId,
        /// Failure cause
        error: ApiError,
    },

    /// Hide the last mutation error
    DismissError,
}

impl ListAction {
    /// Whether this action settles a list request
    #[must_use]
    pub const fn is_load_result(&self) -> bool {
        matches!(self, Self::Loaded { .. } | Self::LoadFailed { .. })
    }
}
