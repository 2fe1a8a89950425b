//! Reducer for the to-do list screen.
//!
//! Every mutation goes through the [`TodoApi`]; the list is then reloaded,
//! except for toggles, which flip the local list first and roll back if the
//! server rejects the change.

use super::types::{EditDraft, LOAD_ERROR_MESSAGE, ListAction, ListState, PendingToggle};
use std::sync::Arc;
use tasklist_core::api_call;
use tasklist_core::todo::{TaskId, format_deadline_input, parse_deadline};
use tasklist_core::todo_api::{ApiError, TodoApi, UpdateRequest};
use tasklist_core::{SmallVec, effect::Effect, environment::Clock, reducer::Reducer, smallvec};

/// Environment dependencies for the list reducer
#[derive(Clone)]
pub struct ListEnvironment {
    /// Server boundary
    pub api: Arc<dyn TodoApi>,
    /// Clock for stamping received lists
    pub clock: Arc<dyn Clock>,
}

impl ListEnvironment {
    /// Creates a new `ListEnvironment`
    #[must_use]
    pub fn new(api: Arc<dyn TodoApi>, clock: Arc<dyn Clock>) -> Self {
        Self { api, clock }
    }
}

/// Reducer for the list screen
#[derive(Clone, Debug, Default)]
pub struct ListReducer;

impl ListReducer {
    /// Creates a new `ListReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Starts a list request for the current filter and sort
    fn load(state: &mut ListState, env: &ListEnvironment) -> Effect<ListAction> {
        state.generation += 1;
        state.loading = true;
        state.load_error = None;

        let generation = state.generation;
        let query = state.query();
        let api = Arc::clone(&env.api);

        api_call! {
            call: api.list(query),
            on_success: |tasks| Some(ListAction::Loaded { generation, tasks }),
            on_error: |error| Some(ListAction::LoadFailed { generation, error })
        }
    }

    fn add(state: &mut ListState, env: &ListEnvironment) -> SmallVec<[Effect<ListAction>; 4]> {
        if state.new_title.trim().is_empty() {
            return SmallVec::new();
        }

        let deadline = match parse_deadline(Some(&state.new_deadline)) {
            Ok(deadline) => deadline,
            Err(error) => {
                state.last_error = Some(error.to_string());
                return SmallVec::new();
            },
        };

        let title = state.new_title.clone();
        let api = Arc::clone(&env.api);

        smallvec![api_call! {
            call: api.create(title, deadline),
            on_success: |task| Some(ListAction::Added { task }),
            on_error: |error| Some(ListAction::AddFailed { error })
        }]
    }

    /// Flips the task locally and sends the new value
    fn toggle(state: &mut ListState, id: TaskId, env: &ListEnvironment) -> SmallVec<[Effect<ListAction>; 4]> {
        let snapshot = state.tasks.clone();
        let Some(task) = state.tasks.iter_mut().find(|task| task.id == id) else {
            return SmallVec::new();
        };

        let completed = !task.completed;
        task.completed = completed;
        state.revision += 1;
        state.toggle_token += 1;

        let token = state.toggle_token;
        let revision = state.revision;
        state
            .pending_toggles
            .entry(id)
            .and_modify(|pending| {
                pending.token = token;
                pending.in_flight += 1;
                pending.revision = revision;
            })
            .or_insert_with(|| PendingToggle {
                token,
                in_flight: 1,
                confirmed: !completed,
                confirmed_token: 0,
                failure: None,
                snapshot,
                revision,
            });

        let api = Arc::clone(&env.api);
        smallvec![api_call! {
            call: api.update(UpdateRequest::toggle(id, completed)),
            on_success: |saved| Some(ListAction::ToggleConfirmed { id, token, completed: saved.completed }),
            on_error: |error| Some(ListAction::ToggleFailed { id, token, error })
        }]
    }

    /// Records one toggle response; once none are outstanding, reverts the
    /// task to the confirmed flag unless the newest request succeeded
    fn settle_toggle(state: &mut ListState, id: TaskId, token: u64, outcome: Result<bool, ApiError>) {
        let Some(pending) = state.pending_toggles.get_mut(&id) else {
            tracing::debug!(%id, token, "Toggle response without pending toggle");
            return;
        };

        pending.in_flight = pending.in_flight.saturating_sub(1);
        match outcome {
            Ok(completed) if token > pending.confirmed_token => {
                pending.confirmed = completed;
                pending.confirmed_token = token;
            },
            Ok(_) => {},
            Err(error) => {
                tracing::debug!(%id, token, error = %error, "Toggle request failed");
                pending.failure = Some(error);
            },
        }
        if pending.in_flight > 0 {
            return;
        }

        let Some(pending) = state.pending_toggles.remove(&id) else {
            return;
        };
        if pending.confirmed_token == pending.token {
            return;
        }
        let Some(error) = pending.failure else {
            return;
        };

        let shown = state.task(id).map(|task| task.completed);
        if shown.is_some_and(|completed| completed != pending.confirmed) {
            if pending.confirmed_token == 0 && state.revision == pending.revision {
                state.replace_tasks(pending.snapshot);
            } else if let Some(task) = state.tasks.iter_mut().find(|task| task.id == id) {
                task.completed = pending.confirmed;
                state.revision += 1;
            }
        }

        tracing::warn!(%id, completed = pending.confirmed, error = %error, "Toggle rolled back");
        state.last_error = Some(format!("Could not update task: {error}"));
    }

    fn save_edit(state: &mut ListState, env: &ListEnvironment) -> SmallVec<[Effect<ListAction>; 4]> {
        let Some(draft) = state.editing.as_ref() else {
            return SmallVec::new();
        };
        if draft.title.trim().is_empty() {
            return SmallVec::new();
        }

        let deadline = match parse_deadline(Some(&draft.deadline)) {
            Ok(deadline) => deadline,
            Err(error) => {
                state.last_error = Some(error.to_string());
                return SmallVec::new();
            },
        };

        let request = UpdateRequest::edit(draft.id, draft.title.clone(), deadline);
        let api = Arc::clone(&env.api);

        smallvec![api_call! {
            call: api.update(request),
            on_success: |task| Some(ListAction::EditSaved { task }),
            on_error: |error| Some(ListAction::EditFailed { error })
        }]
    }
}

impl Reducer for ListReducer {
    type State = ListState;
    type Action = ListAction;
    type Environment = ListEnvironment;

    #[allow(clippy::too_many_lines)] // One arm per action
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Loading ==========
            ListAction::Mounted | ListAction::Retry => smallvec![Self::load(state, env)],

            ListAction::FilterChanged { filter } => {
                state.filter = filter;
                smallvec![Self::load(state, env)]
            },

            ListAction::SortChanged { sort } => {
                state.sort = sort;
                smallvec![Self::load(state, env)]
            },

            ListAction::Loaded { generation, tasks } => {
                if generation != state.generation {
                    tracing::debug!(generation, current = state.generation, "Discarding stale list");
                    return SmallVec::new();
                }
                state.loading = false;
                state.load_error = None;
                state.loaded_at = Some(env.clock.now());
                state.replace_tasks(tasks);
                SmallVec::new()
            },

            ListAction::LoadFailed { generation, error } => {
                if generation != state.generation {
                    return SmallVec::new();
                }
                tracing::warn!(error = %error, "Failed to load todos");
                state.loading = false;
                state.load_error = Some(LOAD_ERROR_MESSAGE.to_string());
                state.replace_tasks(Vec::new());
                SmallVec::new()
            },

            // ========== Add ==========
            ListAction::NewTitleChanged { title } => {
                state.new_title = title;
                SmallVec::new()
            },

            ListAction::NewDeadlineChanged { deadline } => {
                state.new_deadline = deadline;
                SmallVec::new()
            },

            ListAction::AddRequested => Self::add(state, env),

            ListAction::Added { task } => {
                tracing::debug!(id = %task.id, "Todo added");
                state.new_title.clear();
                state.new_deadline.clear();
                state.last_error = None;
                smallvec![Self::load(state, env)]
            },

            ListAction::AddFailed { error } => {
                state.last_error = Some(format!("Could not add task: {error}"));
                SmallVec::new()
            },

            // ========== Toggle ==========
            ListAction::ToggleRequested { id } => Self::toggle(state, id, env),

            ListAction::ToggleConfirmed { id, token, completed } => {
                Self::settle_toggle(state, id, token, Ok(completed));
                SmallVec::new()
            },

            ListAction::ToggleFailed { id, token, error } => {
                Self::settle_toggle(state, id, token, Err(error));
                SmallVec::new()
            },

            // ========== Edit ==========
            ListAction::EditStarted { id } => {
                let draft = state.task(id).map(|task| EditDraft {
                    id,
                    title: task.title.clone(),
                    deadline: task.deadline.map(format_deadline_input).unwrap_or_default(),
                });
                if draft.is_some() {
                    state.editing = draft;
                }
                SmallVec::new()
            },

            ListAction::EditTitleChanged { title } => {
                if let Some(draft) = state.editing.as_mut() {
                    draft.title = title;
                }
                SmallVec::new()
            },

            ListAction::EditDeadlineChanged { deadline } => {
                if let Some(draft) = state.editing.as_mut() {
                    draft.deadline = deadline;
                }
                SmallVec::new()
            },

            ListAction::EditCancelled => {
                state.editing = None;
                SmallVec::new()
            },

            ListAction::SaveEditRequested => Self::save_edit(state, env),

            ListAction::EditSaved { task } => {
                if state.editing.as_ref().is_some_and(|draft| draft.id == task.id) {
                    state.editing = None;
                }
                state.last_error = None;
                smallvec![Self::load(state, env)]
            },

            ListAction::EditFailed { error } => {
                state.last_error = Some(format!("Could not save task: {error}"));
                SmallVec::new()
            },

            // ========== Delete ==========
            ListAction::DeleteRequested { id } => {
                let api = Arc::clone(&env.api);
                smallvec![api_call! {
                    call: api.delete(id),
                    on_success: |()| Some(ListAction::Deleted { id }),
                    on_error: |error| Some(ListAction::DeleteFailed { id, error })
                }]
            },

            ListAction::Deleted { id } => {
                if state.editing.as_ref().is_some_and(|draft| draft.id == id) {
                    state.editing = None;
                }
                state.last_error = None;
                smallvec![Self::load(state, env)]
            },

            ListAction::DeleteFailed { id, error } => {
                tracing::warn!(%id, error = %error, "Delete failed");
                state.last_error = Some(format!("Could not delete task: {error}"));
                SmallVec::new()
            },

            ListAction::DismissError => {
                state.last_error = None;
                SmallVec::new()
            },
        }
    }
}
