//! Translation between persisted records and domain values.
//!
//! # Responsibility
//! - Resolve a note's `color_id`/`tag_id` into embedded domain values.
//! - Convert a domain note back into its persisted row shape.
//!
//! # Invariants
//! - No I/O and no state; every function is a pure transform.
//! - A dangling color/tag reference fails the whole batch.

use crate::model::color::Color;
use crate::model::note::Note;
use crate::model::tag::Tag;
use crate::model::RecordId;
use crate::store::{ColorRecord, NoteRecord, TagRecord};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Integrity failure raised while resolving note references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapperError {
    MissingColor {
        note_id: Option<RecordId>,
        color_id: RecordId,
    },
    MissingTag {
        note_id: Option<RecordId>,
        tag_id: RecordId,
    },
}

impl Display for MapperError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingColor { note_id, color_id } => write!(
                f,
                "color {color_id} referenced by note {} was not found",
                display_id(*note_id)
            ),
            Self::MissingTag { note_id, tag_id } => write!(
                f,
                "tag {tag_id} referenced by note {} was not found",
                display_id(*note_id)
            ),
        }
    }
}

impl Error for MapperError {}

fn display_id(id: Option<RecordId>) -> String {
    id.map_or_else(|| "<unsaved>".to_string(), |id| id.to_string())
}

/// Maps persisted notes into domain notes, preserving order.
///
/// # Errors
/// - `MissingColor` / `MissingTag` on the first unresolved reference.
pub fn map_notes(
    records: &[NoteRecord],
    colors_by_id: &HashMap<RecordId, ColorRecord>,
    tags_by_id: &HashMap<RecordId, TagRecord>,
) -> Result<Vec<Note>, MapperError> {
    records
        .iter()
        .map(|record| -> Result<Note, MapperError> {
            let color = colors_by_id
                .get(&record.color_id)
                .ok_or(MapperError::MissingColor {
                    note_id: record.id,
                    color_id: record.color_id,
                })?;
            let tag = tags_by_id
                .get(&record.tag_id)
                .ok_or(MapperError::MissingTag {
                    note_id: record.id,
                    tag_id: record.tag_id,
                })?;
            Ok(map_note(record, color, tag))
        })
        .collect()
}

fn map_note(record: &NoteRecord, color: &ColorRecord, tag: &TagRecord) -> Note {
    Note {
        // Rows read back from the store always carry an id.
        id: record.id.unwrap_or_default(),
        title: record.title.clone(),
        content: record.content.clone(),
        color: map_color(color),
        tag: map_tag(tag),
        is_in_trash: record.in_trash,
    }
}

pub fn map_colors(records: &[ColorRecord]) -> Vec<Color> {
    records.iter().map(map_color).collect()
}

fn map_color(record: &ColorRecord) -> Color {
    Color {
        id: record.id.unwrap_or_default(),
        name: record.name.clone(),
        hex: record.hex.clone(),
    }
}

pub fn map_tags(records: &[TagRecord]) -> Vec<Tag> {
    records.iter().map(map_tag).collect()
}

fn map_tag(record: &TagRecord) -> Tag {
    Tag {
        id: record.id.unwrap_or_default(),
        name: record.name.clone(),
    }
}

/// Converts a domain note into the row written to the notes store.
///
/// A note carrying the sentinel id becomes an id-less, non-trashed row so the
/// store generates its key.
pub fn to_persisted_note(note: &Note) -> NoteRecord {
    if note.is_new() {
        NoteRecord {
            id: None,
            title: note.title.clone(),
            content: note.content.clone(),
            color_id: note.color.id,
            tag_id: note.tag.id,
            in_trash: false,
        }
    } else {
        NoteRecord {
            id: Some(note.id),
            title: note.title.clone(),
            content: note.content.clone(),
            color_id: note.color.id,
            tag_id: note.tag.id,
            in_trash: note.is_in_trash,
        }
    }
}

/// Keys color rows by id for `map_notes`.
pub fn index_colors(records: Vec<ColorRecord>) -> HashMap<RecordId, ColorRecord> {
    records
        .into_iter()
        .filter_map(|record| record.id.map(|id| (id, record)))
        .collect()
}

/// Keys tag rows by id for `map_notes`.
pub fn index_tags(records: Vec<TagRecord>) -> HashMap<RecordId, TagRecord> {
    records
        .into_iter()
        .filter_map(|record| record.id.map(|id| (id, record)))
        .collect()
}
