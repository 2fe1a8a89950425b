//! Task data model.
//!
//! A [`Task`] is the only entity in the system. This module also holds the
//! list query vocabulary ([`Filter`], [`Sort`], [`ListQuery`]), the inputs to
//! the two write operations ([`NewTask`], [`TaskPatch`]) and deadline parsing
//! for the formats browsers and API clients send.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use thiserror::Error;

/// Tasks whose deadline is closer than this many seconds are "near deadline".
pub const NEAR_DEADLINE_SECS: i64 = 24 * 60 * 60;

/// Unique identifier for a task, assigned by the store
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(i64);

impl TaskId {
    /// Creates a `TaskId` from a raw integer
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw integer
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single to-do item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier
    pub id: TaskId,
    /// What needs doing
    pub title: String,
    /// Whether the task is done
    pub completed: bool,
    /// Optional due date
    pub deadline: Option<DateTime<Utc>>,
    /// When the task was created
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Builds a freshly created task
    #[must_use]
    pub fn new(id: TaskId, new_task: NewTask, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: new_task.title,
            completed: false,
            deadline: new_task.deadline,
            created_at,
        }
    }

    /// Whether the deadline is less than a day away (or already passed)
    #[must_use]
    pub fn is_near_deadline(&self, now: DateTime<Utc>) -> bool {
        self.deadline
            .is_some_and(|deadline| (deadline - now).num_seconds() < NEAR_DEADLINE_SECS)
    }
}

/// Completion predicate for list queries
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    /// Every task
    #[default]
    All,
    /// Tasks with `completed = false`
    Active,
    /// Tasks with `completed = true`
    Completed,
}

impl Filter {
    /// Parses a query-string value; anything unrecognised means `All`
    #[must_use]
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("active") => Self::Active,
            Some("completed") => Self::Completed,
            _ => Self::All,
        }
    }

    /// Query-string form
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }

    /// The `completed` value this filter requires, if any
    #[must_use]
    pub const fn completed(self) -> Option<bool> {
        match self {
            Self::All => None,
            Self::Active => Some(false),
            Self::Completed => Some(true),
        }
    }

    /// Whether a task passes this filter
    #[must_use]
    pub fn matches(self, task: &Task) -> bool {
        self.completed().is_none_or(|completed| task.completed == completed)
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordering key for list queries
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sort {
    /// `created_at` descending
    #[default]
    Newest,
    /// `deadline` ascending (no deadline last), then `created_at` descending
    Deadline,
}

impl Sort {
    /// Parses a query-string value; anything unrecognised means `Newest`
    #[must_use]
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("deadline") => Self::Deadline,
            _ => Self::Newest,
        }
    }

    /// Query-string form
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Deadline => "deadline",
        }
    }

    /// Total order over tasks for this sort key.
    ///
    /// Ties fall back to `created_at` descending, then `id` descending.
    #[must_use]
    pub fn compare(self, a: &Task, b: &Task) -> Ordering {
        let newest_first = b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id));
        match self {
            Self::Newest => newest_first,
            Self::Deadline => {
                let by_deadline = match (a.deadline, b.deadline) {
                    (Some(left), Some(right)) => left.cmp(&right),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                };
                by_deadline.then(newest_first)
            },
        }
    }
}

impl std::fmt::Display for Sort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter and sort for a list call
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Completion predicate
    pub filter: Filter,
    /// Ordering
    pub sort: Sort,
}

impl ListQuery {
    /// Creates a list query
    #[must_use]
    pub const fn new(filter: Filter, sort: Sort) -> Self {
        Self { filter, sort }
    }

    /// Applies the query to an in-memory collection
    #[must_use]
    pub fn apply<'a>(&self, tasks: impl IntoIterator<Item = &'a Task>) -> Vec<Task> {
        let mut matching: Vec<Task> = tasks
            .into_iter()
            .filter(|task| self.filter.matches(task))
            .cloned()
            .collect();
        matching.sort_by(|a, b| self.sort.compare(a, b));
        matching
    }
}

/// Validation failures for task input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Title missing or empty
    #[error("Title is required")]
    EmptyTitle,

    /// Deadline could not be parsed
    #[error("Invalid deadline: {0}")]
    InvalidDeadline(String),
}

/// Input for creating a task
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewTask {
    /// Title, never empty
    pub title: String,
    /// Optional deadline
    pub deadline: Option<DateTime<Utc>>,
}

impl NewTask {
    /// Validates and builds creation input.
    ///
    /// Only the empty string is rejected; whitespace-only titles are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`TaskValidationError::EmptyTitle`] when `title` is empty.
    pub fn new(
        title: impl Into<String>,
        deadline: Option<DateTime<Utc>>,
    ) -> Result<Self, TaskValidationError> {
        let title = title.into();
        if title.is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        Ok(Self { title, deadline })
    }
}

/// Partial update of a task.
///
/// `None` means "leave unchanged". For `deadline`, `Some(None)` clears it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TaskPatch {
    /// New title
    pub title: Option<String>,
    /// New completion flag
    pub completed: Option<bool>,
    /// New deadline, or `Some(None)` to clear
    pub deadline: Option<Option<DateTime<Utc>>>,
}

impl TaskPatch {
    /// Empty patch
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the title
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the completion flag
    #[must_use]
    pub const fn with_completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    /// Sets or clears the deadline
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Option<DateTime<Utc>>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Whether the patch changes nothing
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.completed.is_none() && self.deadline.is_none()
    }

    /// Rejects a patch that would persist an empty title.
    ///
    /// # Errors
    ///
    /// Returns [`TaskValidationError::EmptyTitle`] when `title` is `Some("")`.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        match &self.title {
            Some(title) if title.is_empty() => Err(TaskValidationError::EmptyTitle),
            _ => Ok(()),
        }
    }

    /// Applies the provided fields to a task
    pub fn apply(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title.clone_from(title);
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        if let Some(deadline) = self.deadline {
            task.deadline = deadline;
        }
    }
}

/// Parses a deadline as sent by clients.
///
/// Accepted forms: RFC 3339 (`2025-01-01T10:00:00Z`), `datetime-local`
/// (`2025-01-01T10:00` or with seconds, taken as UTC) and a plain date
/// (`2025-01-01`, UTC midnight). `None` and `""` mean "no deadline".
///
/// # Errors
///
/// Returns [`TaskValidationError::InvalidDeadline`] for any other input.
pub fn parse_deadline(input: Option<&str>) -> Result<Option<DateTime<Utc>>, TaskValidationError> {
    let Some(raw) = input.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(None);
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }

    for format in ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(Some(naive.and_utc()));
        }
    }

    if let Some(midnight) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(Some(midnight.and_utc()));
    }

    Err(TaskValidationError::InvalidDeadline(raw.to_string()))
}

/// Formats a deadline the way a `datetime-local` input expects it
#[must_use]
pub fn format_deadline_input(deadline: DateTime<Utc>) -> String {
    deadline.format("%Y-%m-%dT%H:%M").to_string()
}

/// Formats a deadline for the wire (RFC 3339, second precision)
#[must_use]
pub fn format_deadline_rfc3339(deadline: DateTime<Utc>) -> String {
    deadline.to_rfc3339_opts(SecondsFormat::Secs, true)
}
