//! New-task form for the terminal user interface.
//!
//! The form only produces a `Task`; adding it to the store is the caller's job.
//! Submission is refused while the title is blank.

use chrono::{NaiveDate, Utc};

use crate::display::parse_due_input;
use crate::fields::{Priority, Status};
use crate::store::TaskStore;
use crate::task::{known_users, Assignee, Task, PROJECTS};
use crate::tui::input::InputField;

pub const TITLE_FIELD: usize = 0;
pub const DESCRIPTION_FIELD: usize = 1;
pub const STATUS_FIELD: usize = 2;
pub const PRIORITY_FIELD: usize = 3;
pub const ASSIGNEE_FIELD: usize = 4;
pub const PROJECT_FIELD: usize = 5;
pub const DUE_FIELD: usize = 6;
pub const FIELD_COUNT: usize = 7;

pub struct TaskForm {
    pub title: InputField,
    pub description: InputField,
    pub due: InputField,
    pub status: usize,
    pub priority: usize,
    /// 0 is "Unassigned"; n is `users[n - 1]`.
    pub assignee: usize,
    pub project: usize,
    pub current_field: usize,
    pub users: Vec<Assignee>,
}

impl Default for TaskForm {
    fn default() -> Self {
        TaskForm {
            title: InputField::new(),
            description: InputField::new(),
            due: InputField::new(),
            status: Status::Todo.column_index(),
            priority: Priority::ALL
                .iter()
                .position(|p| *p == Priority::Medium)
                .unwrap_or(0),
            assignee: 0,
            project: 0,
            current_field: TITLE_FIELD,
            users: known_users(),
        }
    }
}

impl TaskForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether the submit action is enabled.
    pub fn can_submit(&self) -> bool {
        !self.title.value.trim().is_empty()
    }

    pub fn is_text_field(&self) -> bool {
        matches!(self.current_field, TITLE_FIELD | DESCRIPTION_FIELD | DUE_FIELD)
    }

    pub fn next_field(&mut self) {
        self.current_field = (self.current_field + 1) % FIELD_COUNT;
    }

    pub fn prev_field(&mut self) {
        self.current_field = (self.current_field + FIELD_COUNT - 1) % FIELD_COUNT;
    }

    /// The text input under the cursor, if the current field is a text field.
    pub fn current_input(&mut self) -> Option<&mut InputField> {
        match self.current_field {
            TITLE_FIELD => Some(&mut self.title),
            DESCRIPTION_FIELD => Some(&mut self.description),
            DUE_FIELD => Some(&mut self.due),
            _ => None,
        }
    }

    /// Step the selector under the cursor forwards or backwards.
    pub fn cycle(&mut self, forward: bool) {
        let (slot, len) = match self.current_field {
            STATUS_FIELD => (&mut self.status, Status::ALL.len()),
            PRIORITY_FIELD => (&mut self.priority, Priority::ALL.len()),
            ASSIGNEE_FIELD => (&mut self.assignee, self.users.len() + 1),
            PROJECT_FIELD => (&mut self.project, PROJECTS.len()),
            _ => return,
        };
        *slot = if forward { (*slot + 1) % len } else { (*slot + len - 1) % len };
    }

    pub fn selected_status(&self) -> Status {
        Status::ALL[self.status % Status::ALL.len()]
    }

    pub fn selected_priority(&self) -> Priority {
        Priority::ALL[self.priority % Priority::ALL.len()]
    }

    pub fn selected_assignee(&self) -> Option<&Assignee> {
        self.assignee.checked_sub(1).and_then(|i| self.users.get(i))
    }

    pub fn assignee_label(&self) -> String {
        self.selected_assignee()
            .map(|a| a.name.clone())
            .unwrap_or_else(|| "Unassigned".to_string())
    }

    pub fn project_label(&self) -> &'static str {
        PROJECTS[self.project % PROJECTS.len()].name
    }

    /// Build the task, with a fresh id from `store` and both timestamps set to now.
    pub fn build(&self, store: &TaskStore, today: NaiveDate) -> Result<Task, String> {
        let title = self.title.value.trim();
        if title.is_empty() {
            return Err("Title is required".to_string());
        }
        let due_input = self.due.value.trim();
        let due_date = if due_input.is_empty() {
            None
        } else {
            Some(parse_due_input(due_input, today).ok_or_else(|| {
                "Unrecognised due date. Use YYYY-MM-DD, 'today', 'tomorrow', or 'in Nd'."
                    .to_string()
            })?)
        };
        let description = self.description.value.trim();
        let now = Utc::now();

        let mut task = Task::new(store.fresh_id(), title);
        task.description = (!description.is_empty()).then(|| description.to_string());
        task.status = self.selected_status();
        task.priority = self.selected_priority();
        task.assignee = self.selected_assignee().cloned();
        task.project_id = Some(PROJECTS[self.project % PROJECTS.len()].id.to_string());
        task.due_date = due_date;
        task.created_at = Some(now);
        task.updated_at = Some(now);
        Ok(task)
    }
}
