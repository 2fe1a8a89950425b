//! The reusable per-task row.

use super::types::{EditDraft, ListState};
use chrono::{DateTime, Utc};
use tasklist_core::todo::{Task, TaskId};

/// Deadline text for a task without one
pub const NO_DEADLINE: &str = "-";

/// What one list row shows
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TodoRow {
    /// Task shown
    pub id: TaskId,
    /// Checkbox state
    pub checked: bool,
    /// Title text
    pub title: String,
    /// Title is struck through
    pub struck: bool,
    /// `YYYY-MM-DD HH:MM`, or [`NO_DEADLINE`]
    pub deadline_text: String,
    /// Deadline is within a day or overdue
    pub near_deadline: bool,
    /// Edit inputs, when this row is in edit mode
    pub editing: Option<EditDraft>,
}

impl TodoRow {
    /// Builds the row for `task`; `editing` is kept only if it targets this task
    #[must_use]
    pub fn new(task: &Task, now: DateTime<Utc>, editing: Option<&EditDraft>) -> Self {
        Self {
            id: task.id,
            checked: task.completed,
            title: task.title.clone(),
            struck: task.completed,
            deadline_text: task.deadline.map_or_else(
                || NO_DEADLINE.to_string(),
                |deadline| deadline.format("%Y-%m-%d %H:%M").to_string(),
            ),
            near_deadline: task.is_near_deadline(now),
            editing: editing.filter(|draft| draft.id == task.id).cloned(),
        }
    }

    /// Single-line text rendering
    #[must_use]
    pub fn render(&self) -> String {
        if let Some(draft) = &self.editing {
            let deadline = if draft.deadline.is_empty() {
                NO_DEADLINE
            } else {
                draft.deadline.as_str()
            };
            return format!("#{} editing: [{}] due [{deadline}]", self.id, draft.title);
        }

        let checkbox = if self.checked { "[x]" } else { "[ ]" };
        let title = if self.struck {
            format!("~~{}~~", self.title)
        } else {
            self.title.clone()
        };
        let marker = if self.near_deadline { " !" } else { "" };
        format!("{checkbox} #{} {title} (due {}){marker}", self.id, self.deadline_text)
    }
}

/// Rows for every shown task, judged against `now`
#[must_use]
pub fn rows(state: &ListState, now: DateTime<Utc>) -> Vec<TodoRow> {
    state
        .tasks
        .iter()
        .map(|task| TodoRow::new(task, now, state.editing.as_ref()))
        .collect()
}

/// Renders rows one per line
#[must_use]
pub fn render_rows(rows: &[TodoRow]) -> String {
    rows.iter().map(|row| row.render() + "\n").collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
    }

    fn task(completed: bool, deadline: Option<DateTime<Utc>>) -> Task {
        Task {
            id: TaskId::new(4),
            title: "Water plants".to_string(),
            completed,
            deadline,
            created_at: now(),
        }
    }

    #[test]
    fn open_task_without_deadline() {
        let row = TodoRow::new(&task(false, None), now(), None);
        assert!(!row.checked);
        assert!(!row.near_deadline);
        assert_eq!(row.deadline_text, NO_DEADLINE);
        assert_eq!(row.render(), "[ ] #4 Water plants (due -)");
    }

    #[test]
    fn completed_task_is_struck_and_flags_near_deadline() {
        let row = TodoRow::new(&task(true, Some(now() + Duration::hours(3))), now(), None);
        assert!(row.struck);
        assert!(row.near_deadline);
        assert_eq!(row.render(), "[x] #4 ~~Water plants~~ (due 2025-01-01 15:00) !");
    }

    #[test]
    fn distant_deadline_is_not_highlighted() {
        let row = TodoRow::new(&task(false, Some(now() + Duration::days(3))), now(), None);
        assert!(!row.near_deadline);
    }

    #[test]
    fn edit_draft_only_applies_to_its_task() {
        let draft = EditDraft {
            id: TaskId::new(4),
            title: "Water ferns".to_string(),
            deadline: String::new(),
        };
        let row = TodoRow::new(&task(false, None), now(), Some(&draft));
        assert_eq!(row.render(), "#4 editing: [Water ferns] due [-]");

        let other = EditDraft {
            id: TaskId::new(5),
            ..draft
        };
        assert!(TodoRow::new(&task(false, None), now(), Some(&other)).editing.is_none());
    }

    #[test]
    fn render_rows_one_line_each() {
        let mut state = ListState::new();
        state.tasks = vec![task(false, None), task(true, None)];
        let text = render_rows(&rows(&state, now()));
        assert_eq!(text.lines().count(), 2);
        assert!(text.ends_with('\n'));
        assert_eq!(render_rows(&[]), "");
    }
}
