//! Task record and its patch shape.

use super::{EntityId, Timestamp};
use serde::{Deserialize, Serialize};

/// Actionable item, optionally scheduled on a calendar date and linked to a
/// project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: EntityId,
    pub title: String,
    pub description: String,
    /// Dangling references are tolerated; the store never validates them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<EntityId>,
    /// ISO calendar date (`YYYY-MM-DD`). `None` means unscheduled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub completed: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: Timestamp,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: Timestamp,
}

/// Mutable task fields.
///
/// Clearable fields use `Option<Option<_>>`: outer `None` keeps the current
/// value, `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub project_id: Option<Option<EntityId>>,
    pub date: Option<Option<String>>,
    pub completed: Option<bool>,
}

impl TaskPatch {
    /// Patch that only toggles completion.
    pub fn completed(value: bool) -> Self {
        Self {
            completed: Some(value),
            ..Self::default()
        }
    }

    /// Applies the patch onto `task`. Does not touch `updated_at`.
    pub(crate) fn apply(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(project_id) = self.project_id {
            task.project_id = project_id;
        }
        if let Some(date) = self.date {
            task.date = date;
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
    }
}
