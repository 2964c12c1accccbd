//! Project operations, including the task cascade on delete.

use super::EntityStore;
use crate::model::project::{Project, ProjectPatch};
use crate::model::{allocate_id, now, stamp_after};
use log::debug;

impl EntityStore {
    pub fn create_project(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Project {
        let stamp = now();
        let id = allocate_id(|candidate| {
            self.projects
                .iter()
                .any(|project| project.id == candidate)
        });
        let project = Project {
            id,
            name: name.into(),
            description: description.into(),
            tasks: Vec::new(),
            created_at: stamp,
            updated_at: stamp,
        };

        self.projects.push(project.clone());
        self.save_projects();
        debug!("event=project_create module=store status=ok id={}", project.id);
        project
    }

    /// Merges `patch` into the project with `id`. Missing ids are ignored.
    pub fn update_project(&mut self, id: &str, patch: ProjectPatch) {
        if let Some(project) = self.projects.iter_mut().find(|project| project.id == id) {
            patch.apply(project);
            project.updated_at = stamp_after(project.updated_at);
        }
        self.save_projects();
    }

    /// Removes the project and clears `project_id` on every task that
    /// referenced it. Notes tagged with the project keep the dangling id.
    pub fn delete_project(&mut self, id: &str) {
        self.projects.retain(|project| project.id != id);

        let mut detached = 0_usize;
        for task in self
            .tasks
            .iter_mut()
            .filter(|task| task.project_id.as_deref() == Some(id))
        {
            task.project_id = None;
            task.updated_at = stamp_after(task.updated_at);
            detached += 1;
        }

        self.save_projects();
        self.save_tasks();
        debug!("event=project_delete module=store status=ok id={id} detached_tasks={detached}");
    }

    pub fn get_project_by_id(&self, id: &str) -> Option<Project> {
        self.projects.iter().find(|project| project.id == id).cloned()
    }
}
