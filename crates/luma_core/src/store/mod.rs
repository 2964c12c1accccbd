//! Entity store for tasks, projects and notes.
//!
//! # Responsibility
//! - Hold the authoritative in-memory copy of all three collections.
//! - Persist the full affected collection after every mutation.
//!
//! # Invariants
//! - Collections are loaded once at construction; absent or corrupt data
//!   yields empty collections.
//! - No operation reports "not found": mutating a missing id is a no-op.
//! - Storage failures never reach callers (see `crate::storage`).
//! - Deleting a project clears `project_id` on its tasks but leaves note
//!   `project_ids` untouched.

mod notes;
mod projects;
mod tasks;

pub use tasks::DaySchedule;

use crate::model::note::Note;
use crate::model::project::Project;
use crate::model::task::Task;
use crate::storage::PersistentStorage;
use log::info;

/// Storage key for the task collection.
pub const TASKS_KEY: &str = "luma-tasks";
/// Storage key for the project collection.
pub const PROJECTS_KEY: &str = "luma-projects";
/// Storage key for the note collection.
pub const NOTES_KEY: &str = "luma-notes";

/// In-memory entity collections with write-through persistence.
///
/// Constructed once at application start and passed to whoever needs it.
pub struct EntityStore {
    storage: PersistentStorage,
    tasks: Vec<Task>,
    projects: Vec<Project>,
    notes: Vec<Note>,
}

impl EntityStore {
    /// Loads all collections from `storage`.
    pub fn load(storage: PersistentStorage) -> Self {
        let mut store = Self {
            storage,
            tasks: Vec::new(),
            projects: Vec::new(),
            notes: Vec::new(),
        };
        store.reload();
        store
    }

    /// Replaces in-memory state with what storage currently holds.
    pub fn reload(&mut self) {
        self.tasks = self.storage.load(TASKS_KEY, Vec::new());
        self.projects = self.storage.load(PROJECTS_KEY, Vec::new());
        self.notes = self.storage.load(NOTES_KEY, Vec::new());
        info!(
            "event=store_load module=store status=ok tasks={} projects={} notes={} storage_available={}",
            self.tasks.len(),
            self.projects.len(),
            self.notes.len(),
            self.storage.is_available()
        );
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Storage handle this store writes through.
    pub fn storage(&self) -> &PersistentStorage {
        &self.storage
    }

    fn save_tasks(&self) {
        self.storage.save(TASKS_KEY, &self.tasks);
    }

    fn save_projects(&self) {
        self.storage.save(PROJECTS_KEY, &self.projects);
    }

    fn save_notes(&self) {
        self.storage.save(NOTES_KEY, &self.notes);
    }
}
