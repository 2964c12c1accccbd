//! Task operations.

use super::EntityStore;
use crate::calendar::{format_date, WeekView};
use crate::model::task::{Task, TaskPatch};
use crate::model::{allocate_id, now, stamp_after};
use log::debug;
use time::Date;

/// Tasks placed on one day of a week view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySchedule {
    pub date: Date,
    pub tasks: Vec<Task>,
}

impl EntityStore {
    /// Creates a task, stamping `created_at = updated_at = now`.
    pub fn create_task(
        &mut self,
        title: impl Into<String>,
        description: impl Into<String>,
        date: Option<String>,
        project_id: Option<String>,
    ) -> Task {
        let stamp = now();
        let id = allocate_id(|candidate| self.tasks.iter().any(|task| task.id == candidate));
        let task = Task {
            id,
            title: title.into(),
            description: description.into(),
            project_id,
            date,
            completed: false,
            created_at: stamp,
            updated_at: stamp,
        };

        self.tasks.push(task.clone());
        self.save_tasks();
        debug!("event=task_create module=store status=ok id={}", task.id);
        task
    }

    /// Merges `patch` into the task with `id`. Missing ids are ignored.
    pub fn update_task(&mut self, id: &str, patch: TaskPatch) {
        if let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) {
            patch.apply(task);
            task.updated_at = stamp_after(task.updated_at);
            debug!("event=task_update module=store status=ok id={id}");
        }
        self.save_tasks();
    }

    pub fn delete_task(&mut self, id: &str) {
        self.tasks.retain(|task| task.id != id);
        self.save_tasks();
    }

    pub fn get_task_by_id(&self, id: &str) -> Option<Task> {
        self.tasks.iter().find(|task| task.id == id).cloned()
    }

    /// Tasks whose `date` equals `date` exactly, in insertion order.
    pub fn get_tasks_by_date(&self, date: &str) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|task| task.date.as_deref() == Some(date))
            .cloned()
            .collect()
    }

    /// Tasks whose `project_id` equals `project_id`, in insertion order.
    pub fn get_tasks_by_project(&self, project_id: &str) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|task| task.project_id.as_deref() == Some(project_id))
            .cloned()
            .collect()
    }

    /// Groups scheduled tasks into the seven days of `week`.
    pub fn tasks_for_week(&self, week: &WeekView) -> Vec<DaySchedule> {
        week.dates()
            .into_iter()
            .map(|date| DaySchedule {
                date,
                tasks: self.get_tasks_by_date(format_date(date).as_str()),
            })
            .collect()
    }
}
