//! Note record, its patch shape and tag-set helpers.
//!
//! # Invariants
//! - `project_ids` and `task_ids` never contain duplicates when mutated
//!   through [`Note::tag_project`]/[`Note::tag_task`].

use super::{EntityId, Timestamp};
use serde::{Deserialize, Serialize};

/// Free-form markdown note tagged to projects and tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: EntityId,
    pub title: String,
    /// Markdown source; never rendered by core.
    pub body: String,
    #[serde(default)]
    pub project_ids: Vec<EntityId>,
    #[serde(default)]
    pub task_ids: Vec<EntityId>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: Timestamp,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: Timestamp,
}

impl Note {
    /// Adds `project_id` to the tag set. Returns whether the set changed.
    pub fn tag_project(&mut self, project_id: &str) -> bool {
        insert_unique(&mut self.project_ids, project_id)
    }

    /// Removes `project_id` from the tag set. Returns whether the set changed.
    pub fn untag_project(&mut self, project_id: &str) -> bool {
        remove_all(&mut self.project_ids, project_id)
    }

    /// Adds `task_id` to the tag set. Returns whether the set changed.
    pub fn tag_task(&mut self, task_id: &str) -> bool {
        insert_unique(&mut self.task_ids, task_id)
    }

    /// Removes `task_id` from the tag set. Returns whether the set changed.
    pub fn untag_task(&mut self, task_id: &str) -> bool {
        remove_all(&mut self.task_ids, task_id)
    }
}

/// Mutable note fields. Tag sets given here replace the stored ones verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotePatch {
    pub title: Option<String>,
    pub body: Option<String>,
    pub project_ids: Option<Vec<EntityId>>,
    pub task_ids: Option<Vec<EntityId>>,
}

impl NotePatch {
    pub(crate) fn apply(self, note: &mut Note) {
        if let Some(title) = self.title {
            note.title = title;
        }
        if let Some(body) = self.body {
            note.body = body;
        }
        if let Some(project_ids) = self.project_ids {
            note.project_ids = project_ids;
        }
        if let Some(task_ids) = self.task_ids {
            note.task_ids = task_ids;
        }
    }
}

fn insert_unique(set: &mut Vec<EntityId>, value: &str) -> bool {
    if set.iter().any(|existing| existing == value) {
        return false;
    }
    set.push(value.to_string());
    true
}

fn remove_all(set: &mut Vec<EntityId>, value: &str) -> bool {
    let before = set.len();
    set.retain(|existing| existing != value);
    set.len() != before
}
