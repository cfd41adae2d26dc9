//! Note domain value.
//!
//! # Invariants
//! - `id == NEW_NOTE_ID` means the note has not been saved yet.
//! - `is_in_trash` places the note in exactly one snapshot partition.

use crate::model::color::Color;
use crate::model::tag::Tag;
use crate::model::{RecordId, NEW_NOTE_ID};
use serde::{Deserialize, Serialize};

/// Fully-resolved note as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: RecordId,
    pub title: String,
    pub content: String,
    pub color: Color,
    pub tag: Tag,
    pub is_in_trash: bool,
}

impl Note {
    /// Creates an unsaved note with the given text and embedded values.
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        color: Color,
        tag: Tag,
    ) -> Self {
        Self {
            id: NEW_NOTE_ID,
            title: title.into(),
            content: content.into(),
            color,
            tag,
            is_in_trash: false,
        }
    }

    /// Returns whether this note still carries the sentinel id.
    pub fn is_new(&self) -> bool {
        self.id == NEW_NOTE_ID
    }
}

impl Default for Note {
    /// Blank entry used when the user starts a new note.
    fn default() -> Self {
        Self::new("", "", Color::default(), Tag::default())
    }
}
