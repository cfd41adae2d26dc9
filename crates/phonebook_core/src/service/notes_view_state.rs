//! View-state holder for the notes screens.
//!
//! # Responsibility
//! - Re-expose repository note/color/tag snapshots to the presentation layer.
//! - Track the note entry currently being edited.
//!
//! # Invariants
//! - After a successful save or trash the entry is reset to a blank new note.
//! - A failed save or trash leaves the entry untouched.

use crate::model::color::Color;
use crate::model::note::Note;
use crate::model::tag::Tag;
use crate::model::RecordId;
use crate::repo::note_repo::{RepoResult, Repository};
use tokio::sync::watch;

/// State holder shared by the note list and note editor screens.
pub struct NotesViewState {
    repository: Repository,
    note_entry: watch::Sender<Note>,
}

impl NotesViewState {
    pub fn new(repository: Repository) -> Self {
        let (note_entry, _) = watch::channel(Note::default());
        Self {
            repository,
            note_entry,
        }
    }

    pub fn notes_not_in_trash(&self) -> watch::Receiver<Vec<Note>> {
        self.repository.active_notes()
    }

    pub fn notes_in_trash(&self) -> watch::Receiver<Vec<Note>> {
        self.repository.trashed_notes()
    }

    pub fn colors(&self) -> watch::Receiver<Vec<Color>> {
        self.repository.colors()
    }

    pub fn tags(&self) -> watch::Receiver<Vec<Tag>> {
        self.repository.tags()
    }

    /// Entry edited by the save-note screen.
    pub fn note_entry(&self) -> watch::Receiver<Note> {
        self.note_entry.subscribe()
    }

    /// Whether the current entry edits an already saved note.
    pub fn is_editing_mode(&self) -> bool {
        !self.note_entry.borrow().is_new()
    }

    pub fn on_create_new_note_click(&self) {
        self.note_entry.send_replace(Note::default());
    }

    pub fn on_note_click(&self, note: Note) {
        self.note_entry.send_replace(note);
    }

    pub fn on_note_entry_change(&self, note: Note) {
        self.note_entry.send_replace(note);
    }

    /// Persists `note` and resets the entry.
    pub async fn save_note(&self, note: Note) -> RepoResult<RecordId> {
        let id = self.repository.insert_note(note).await?;
        self.note_entry.send_replace(Note::default());
        Ok(id)
    }

    /// Trashes `note` and resets the entry.
    pub async fn move_note_to_trash(&self, note: &Note) -> RepoResult<()> {
        self.repository.move_note_to_trash(note.id).await?;
        self.note_entry.send_replace(Note::default());
        Ok(())
    }
}
