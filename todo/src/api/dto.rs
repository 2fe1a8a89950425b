//! Request and response bodies of the todo API.

use serde::{Deserialize, Deserializer, Serialize};
use tasklist_core::todo::{
    Filter, ListQuery, NewTask, Sort, TaskId, TaskPatch, TaskValidationError, parse_deadline,
};

/// Query string of `GET /api/todos`.
///
/// Unknown values fall back to the defaults rather than failing.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    /// `all`, `active` or `completed`
    pub filter: Option<String>,
    /// `newest` or `deadline`
    pub sort: Option<String>,
}

impl ListParams {
    /// Resolves to a store query
    #[must_use]
    pub fn to_query(&self) -> ListQuery {
        ListQuery::new(
            Filter::from_query(self.filter.as_deref()),
            Sort::from_query(self.sort.as_deref()),
        )
    }
}

/// Body of `POST /api/todos`.
#[derive(Debug, Default, Deserialize)]
pub struct CreateTodoRequest {
    /// Required, non-empty
    pub title: Option<String>,
    /// Optional deadline; `null` or `""` means none
    pub deadline: Option<String>,
}

impl CreateTodoRequest {
    /// Validates the body into store input.
    ///
    /// # Errors
    ///
    /// Missing or empty title, or an unparseable deadline.
    pub fn into_new_task(self) -> Result<NewTask, TaskValidationError> {
        let title = self.title.ok_or(TaskValidationError::EmptyTitle)?;
        let deadline = parse_deadline(self.deadline.as_deref())?;
        NewTask::new(title, deadline)
    }
}

/// Body of `PUT /api/todos`.
///
/// A key that is absent leaves the field untouched; `"deadline": null`
/// clears the deadline.
#[derive(Debug, Deserialize)]
pub struct UpdateTodoRequest {
    /// Task to update
    pub id: TaskId,
    /// New title
    pub title: Option<String>,
    /// New completion flag
    pub completed: Option<bool>,
    /// `Some(None)` when the key is present with `null`
    #[serde(default, deserialize_with = "deserialize_some")]
    pub deadline: Option<Option<String>>,
}

impl UpdateTodoRequest {
    /// Splits the body into the target id and a validated patch.
    ///
    /// # Errors
    ///
    /// Empty title or an unparseable deadline.
    pub fn into_patch(self) -> Result<(TaskId, TaskPatch), TaskValidationError> {
        let deadline = match self.deadline {
            None => None,
            Some(raw) => Some(parse_deadline(raw.as_deref())?),
        };
        let patch = TaskPatch {
            title: self.title,
            completed: self.completed,
            deadline,
        };
        patch.validate()?;
        Ok((self.id, patch))
    }
}

/// Body of `DELETE /api/todos`.
#[derive(Debug, Deserialize)]
pub struct DeleteTodoRequest {
    /// Task to delete
    pub id: TaskId,
}

/// Response of `DELETE /api/todos`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteTodoResponse {
    /// Always `true` on a 200
    pub success: bool,
}

/// Distinguishes a missing key (`None`, via `#[serde(default)]`) from an
/// explicit `null` (`Some(None)`).
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}
