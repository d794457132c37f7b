//! The in-memory task store.
//!
//! `TaskStore` is the single source of truth for the task collection and the
//! dashboard's UI selection (active view, search query, open detail drawer). It is
//! built once at startup and handed by reference to everything that reads or
//! mutates it. Nothing here touches disk after the optional seed load.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use crate::error::{ConfigError, StoreError};
use crate::fields::*;
use crate::task::{Task, TaskPatch};

/// Task collection plus UI selection state.
#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
    view_type: ViewType,
    search_query: String,
    selected_task_id: Option<String>,
    detail_open: bool,
}

impl TaskStore {
    /// Create a store over the given tasks, in the given order.
    pub fn new(tasks: Vec<Task>) -> Self {
        TaskStore {
            tasks,
            ..Default::default()
        }
    }

    /// Create a store holding the built-in seed list.
    pub fn with_seed() -> Self {
        Self::new(seed_tasks())
    }

    /// All tasks in stored order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Get a task by id.
    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Task> {
        let idx = self.tasks.iter().position(|t| t.id == id)?;
        self.tasks.get_mut(idx)
    }

    /// Generate an id that is not in use: `t<unix millis>`, bumped until free.
    pub fn fresh_id(&self) -> String {
        let mut n = Utc::now().timestamp_millis();
        loop {
            let id = format!("t{n}");
            if self.get(&id).is_none() {
                return id;
            }
            n += 1;
        }
    }

    /// Append a fully formed task.
    ///
    /// Returns `false` and leaves the collection unchanged if the id is already
    /// taken, so ids stay unique.
    pub fn add(&mut self, task: Task) -> bool {
        if self.get(&task.id).is_some() {
            warn!(id = %task.id, "refusing to add task with duplicate id");
            return false;
        }
        debug!(id = %task.id, title = %task.title, "task added");
        self.tasks.push(task);
        true
    }

    /// Merge `patch` into the task with `id` and refresh its `updated_at`.
    /// Returns `false` (and does nothing) if no task has that id.
    pub fn update(&mut self, id: &str, patch: TaskPatch) -> bool {
        let Some(task) = self.get_mut(id) else {
            debug!(id, "update ignored, no such task");
            return false;
        };
        patch.apply_to(task);
        touch(task);
        debug!(id, "task updated");
        true
    }

    /// Move a task to `status`. Any transition is allowed, including to the
    /// status it already has.
    pub fn update_status(&mut self, id: &str, status: Status) -> bool {
        self.update(id, TaskPatch::status(status))
    }

    /// `update_status` for an unvalidated status string. Values outside the
    /// status enumeration are rejected before the collection is looked at.
    pub fn update_status_raw(&mut self, id: &str, status: &str) -> Result<bool, StoreError> {
        let status: Status = status.parse()?;
        Ok(self.update_status(id, status))
    }

    /// Delete the task with `id`. Returns `false` if there was none.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        let removed = self.tasks.len() != before;
        if removed {
            debug!(id, "task removed");
        }
        removed
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    pub fn view_type(&self) -> ViewType {
        self.view_type
    }

    pub fn set_view_type(&mut self, view: ViewType) {
        self.view_type = view;
    }

    /// Select a task for the detail drawer. The id is kept even if no task has
    /// it; `selected_task` then yields `None`.
    pub fn open_detail(&mut self, id: impl Into<String>) {
        self.selected_task_id = Some(id.into());
        self.detail_open = true;
    }

    pub fn close_detail(&mut self) {
        self.selected_task_id = None;
        self.detail_open = false;
    }

    pub fn selected_task_id(&self) -> Option<&str> {
        self.selected_task_id.as_deref()
    }

    pub fn is_detail_open(&self) -> bool {
        self.detail_open
    }

    /// The task shown in the detail drawer, if the drawer is open and the
    /// selected id still exists.
    pub fn selected_task(&self) -> Option<&Task> {
        if !self.detail_open {
            return None;
        }
        self.selected_task_id.as_deref().and_then(|id| self.get(id))
    }

    /// Tasks matching the search query, in stored order. An empty query matches
    /// everything; otherwise title or description must contain the query,
    /// ignoring case.
    pub fn visible_tasks(&self) -> Vec<&Task> {
        if self.search_query.is_empty() {
            return self.tasks.iter().collect();
        }
        let needle = self.search_query.to_lowercase();
        self.tasks.iter().filter(|t| t.matches_query(&needle)).collect()
    }
}

/// Set `updated_at` to now, strictly after its previous value.
fn touch(task: &mut Task) {
    let now = Utc::now();
    task.updated_at = Some(next_timestamp(task.updated_at, now));
}

fn next_timestamp(prev: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DateTime<Utc> {
    match prev {
        Some(p) if now <= p => p + Duration::microseconds(1),
        _ => now,
    }
}

/// The collection every session starts from.
pub fn seed_tasks() -> Vec<Task> {
    let mut design = Task::new("1", "Design initial mockup");
    design.description = Some("Create high-fidelity designs for the dashboard".into());
    design.status = Status::Todo;
    design.priority = Priority::High;
    design.project_id = Some("1".into());

    let mut api = Task::new("2", "Setup API endpoints");
    api.description = Some("Implement core backend services".into());
    api.status = Status::InProgress;
    api.priority = Priority::Medium;
    api.project_id = Some("1".into());

    vec![design, api]
}

/// Read a seed list from a JSON array of tasks. Ids must be unique.
pub fn load_seed_file(path: &Path) -> Result<Vec<Task>, ConfigError> {
    let buf = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let tasks: Vec<Task> = serde_json::from_str(&buf).map_err(|source| ConfigError::Seed {
        path: path.to_path_buf(),
        source,
    })?;

    let mut seen = HashSet::new();
    if let Some(dup) = tasks.iter().find(|t| !seen.insert(t.id.as_str())) {
        return Err(ConfigError::DuplicateId {
            path: path.to_path_buf(),
            id: dup.id.clone(),
        });
    }
    debug!(path = %path.display(), count = tasks.len(), "seed tasks loaded");
    Ok(tasks)
}
