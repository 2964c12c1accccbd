//! Project record and its patch shape.

use super::task::Task;
use super::{EntityId, Timestamp};
use serde::{Deserialize, Serialize};

/// Named grouping for tasks.
///
/// Task membership is tracked through `Task::project_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: EntityId,
    pub name: String,
    pub description: String,
    /// Vestigial: kept in the persisted shape, never populated by the store.
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: Timestamp,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: Timestamp,
}

/// Mutable project fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl ProjectPatch {
    pub(crate) fn apply(self, project: &mut Project) {
        if let Some(name) = self.name {
            project.name = name;
        }
        if let Some(description) = self.description {
            project.description = description;
        }
    }
}
