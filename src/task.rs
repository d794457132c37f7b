//! Task data structure and related functionality.
//!
//! This module defines the `Task` entity tracked by the store, the partial-update
//! `TaskPatch` applied by `TaskStore::update`, and the fixed reference data
//! (users and projects) offered by the new-task form.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::fields::*;

/// Denormalised copy of a user, attached to a task as its assignee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignee {
    pub name: String,
    /// Avatar initials, e.g. "JD".
    pub avatar: String,
}

/// A single work item.
///
/// Field names serialise in camelCase so seed files written for the web dashboard
/// load unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: Status,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<Assignee>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Task {
    /// A todo/medium task with no optional fields set.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Task {
            id: id.into(),
            title: title.into(),
            description: None,
            status: Status::Todo,
            priority: Priority::Medium,
            due_date: None,
            assignee: None,
            project_id: None,
            labels: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    /// Case-insensitive substring match against title and description.
    /// `needle` must already be lowercased.
    pub fn matches_query(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(needle))
    }
}

/// Partial update for a task. `None` leaves a field untouched; for optional task
/// fields `Some(None)` clears the field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub due_date: Option<Option<NaiveDate>>,
    pub assignee: Option<Option<Assignee>>,
    pub project_id: Option<Option<String>>,
    pub labels: Option<Vec<String>>,
}

impl TaskPatch {
    pub fn status(status: Status) -> Self {
        TaskPatch {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Merge the set fields into `task`. Timestamps are the caller's concern.
    pub fn apply_to(self, task: &mut Task) {
        if let Some(v) = self.title {
            task.title = v;
        }
        if let Some(v) = self.description {
            task.description = v;
        }
        if let Some(v) = self.status {
            task.status = v;
        }
        if let Some(v) = self.priority {
            task.priority = v;
        }
        if let Some(v) = self.due_date {
            task.due_date = v;
        }
        if let Some(v) = self.assignee {
            task.assignee = v;
        }
        if let Some(v) = self.project_id {
            task.project_id = v;
        }
        if let Some(v) = self.labels {
            task.labels = v;
        }
    }
}

/// A project a task can be filed under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub id: &'static str,
    pub name: &'static str,
}

/// Users offered as assignees by the new-task form.
pub fn known_users() -> Vec<Assignee> {
    [("John Doe", "JD"), ("Alice Smith", "AS"), ("Bob Johnson", "BJ")]
        .into_iter()
        .map(|(name, avatar)| Assignee {
            name: name.to_string(),
            avatar: avatar.to_string(),
        })
        .collect()
}

pub const PROJECTS: [Project; 3] = [
    Project {
        id: "1",
        name: "Platform Redesign",
    },
    Project {
        id: "2",
        name: "Mobile App",
    },
    Project {
        id: "3",
        name: "Marketing Site",
    },
];

/// Look up a project name by id.
pub fn project_name(id: &str) -> Option<&'static str> {
    PROJECTS.iter().find(|p| p.id == id).map(|p| p.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_matches_query_title_or_description() {
        let mut t = Task::new("1", "Setup API endpoints");
        t.description = Some("Implement core backend SERVICES".into());
        assert!(t.matches_query("setup"));
        assert!(t.matches_query("services"));
        assert!(!t.matches_query("mockup"));

        let bare = Task::new("2", "Write docs");
        assert!(!bare.matches_query("backend"));
    }

    #[test]
    fn test_patch_touches_only_set_fields() {
        let mut t = Task::new("1", "Design initial mockup");
        t.description = Some("hi-fi".into());
        t.labels = vec!["design".into()];
        let before = t.clone();

        TaskPatch {
            priority: Some(Priority::High),
            ..Default::default()
        }
        .apply_to(&mut t);

        assert_eq!(t.priority, Priority::High);
        assert_eq!(Task { priority: before.priority, ..t.clone() }, before);
    }

    #[test]
    fn test_patch_can_clear_optional_fields() {
        let mut t = Task::new("1", "x");
        t.description = Some("y".into());
        t.project_id = Some("1".into());
        TaskPatch {
            description: Some(None),
            project_id: Some(None),
            ..Default::default()
        }
        .apply_to(&mut t);
        assert_eq!(t.description, None);
        assert_eq!(t.project_id, None);
    }

    #[test]
    fn test_seed_json_shape_loads() {
        let json = r#"{
            "id": "1",
            "title": "Design initial mockup",
            "description": "Create high-fidelity designs for the dashboard",
            "status": "todo",
            "priority": "high",
            "projectId": "1",
            "dueDate": "2026-10-20",
            "assignee": { "name": "Alice Smith", "avatar": "AS" }
        }"#;
        let t: Task = serde_json::from_str(json).unwrap();
        assert_eq!(t.project_id.as_deref(), Some("1"));
        assert_eq!(t.due_date, NaiveDate::from_ymd_opt(2026, 10, 20));
        assert_eq!(t.assignee.unwrap().avatar, "AS");
        assert!(t.labels.is_empty());
        assert!(t.updated_at.is_none());
    }

    #[test]
    fn test_project_lookup() {
        assert_eq!(project_name("2"), Some("Mobile App"));
        assert_eq!(project_name("9"), None);
    }
}
