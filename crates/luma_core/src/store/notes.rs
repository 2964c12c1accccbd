//! Note operations and tag-set mutation.

use super::EntityStore;
use crate::model::note::{Note, NotePatch};
use crate::model::{allocate_id, now, stamp_after};
use log::debug;

impl EntityStore {
    /// Creates a note with empty tag sets.
    pub fn create_note(&mut self, title: impl Into<String>, body: impl Into<String>) -> Note {
        let stamp = now();
        let id = allocate_id(|candidate| self.notes.iter().any(|note| note.id == candidate));
        let note = Note {
            id,
            title: title.into(),
            body: body.into(),
            project_ids: Vec::new(),
            task_ids: Vec::new(),
            created_at: stamp,
            updated_at: stamp,
        };

        self.notes.push(note.clone());
        self.save_notes();
        debug!("event=note_create module=store status=ok id={}", note.id);
        note
    }

    /// Merges `patch` into the note with `id`. Missing ids are ignored.
    pub fn update_note(&mut self, id: &str, patch: NotePatch) {
        if let Some(note) = self.notes.iter_mut().find(|note| note.id == id) {
            patch.apply(note);
            note.updated_at = stamp_after(note.updated_at);
        }
        self.save_notes();
    }

    pub fn delete_note(&mut self, id: &str) {
        self.notes.retain(|note| note.id != id);
        self.save_notes();
    }

    pub fn get_note_by_id(&self, id: &str) -> Option<Note> {
        self.notes.iter().find(|note| note.id == id).cloned()
    }

    pub fn tag_note_to_project(&mut self, note_id: &str, project_id: &str) {
        self.mutate_tags(note_id, |note| note.tag_project(project_id));
    }

    pub fn untag_note_from_project(&mut self, note_id: &str, project_id: &str) {
        self.mutate_tags(note_id, |note| note.untag_project(project_id));
    }

    pub fn tag_note_to_task(&mut self, note_id: &str, task_id: &str) {
        self.mutate_tags(note_id, |note| note.tag_task(task_id));
    }

    pub fn untag_note_from_task(&mut self, note_id: &str, task_id: &str) {
        self.mutate_tags(note_id, |note| note.untag_task(task_id));
    }

    // Stamps `updated_at` only when the tag set actually changed.
    fn mutate_tags(&mut self, note_id: &str, mutate: impl FnOnce(&mut Note) -> bool) {
        if let Some(note) = self.notes.iter_mut().find(|note| note.id == note_id) {
            if mutate(note) {
                note.updated_at = stamp_after(note.updated_at);
            }
        }
        self.save_notes();
    }
}
