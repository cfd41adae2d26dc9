//! Fixed default data seeded into empty tables on first run.
//!
//! # Invariants
//! - Default note rows only reference ids present in the default color and
//!   tag sets.
//! - Ids are explicit so seeding is deterministic across installs.

use crate::model::RecordId;
use crate::store::records::{ColorRecord, NoteRecord, TagRecord};

/// `(id, name, hex)` for every default color.
pub const DEFAULT_COLORS: &[(RecordId, &str, &str)] = &[
    (1, "White", "#FFFFFF"),
    (2, "Red", "#E57373"),
    (3, "Pink", "#F06292"),
    (4, "Purple", "#CE93D8"),
    (5, "Blue", "#2196F3"),
    (6, "Cyan", "#00ACC1"),
    (7, "Teal", "#26A69A"),
    (8, "Green", "#4CAF50"),
    (9, "Light Green", "#8BC34A"),
    (10, "Lime", "#CDDC39"),
    (11, "Yellow", "#FFEB3B"),
    (12, "Orange", "#FF9800"),
    (13, "Brown", "#BCAAA4"),
    (14, "Gray", "#9E9E9E"),
];

/// `(id, name)` for every default tag.
pub const DEFAULT_TAGS: &[(RecordId, &str)] =
    &[(1, "General"), (2, "School"), (3, "Home"), (4, "Work")];

/// `(id, title, content, color_id, tag_id, in_trash)` for every default note.
pub const DEFAULT_NOTES: &[(RecordId, &str, &str, RecordId, RecordId, bool)] = &[
    (1, "Mom", "555-0100", 3, 3, false),
    (2, "Dentist", "555-0142, ask for Dr. Ruiz", 5, 1, false),
    (3, "Prof. Okafor", "555-0177, office hours Tue 2pm", 8, 2, false),
    (4, "Team lead", "555-0199", 12, 4, false),
    (5, "Plumber", "555-0163", 7, 3, false),
    (6, "Old landlord", "555-0111", 14, 3, true),
];

pub fn default_colors() -> Vec<ColorRecord> {
    DEFAULT_COLORS
        .iter()
        .map(|&(id, name, hex)| ColorRecord {
            id: Some(id),
            name: name.to_string(),
            hex: hex.to_string(),
        })
        .collect()
}

pub fn default_tags() -> Vec<TagRecord> {
    DEFAULT_TAGS
        .iter()
        .map(|&(id, name)| TagRecord {
            id: Some(id),
            name: name.to_string(),
        })
        .collect()
}

pub fn default_notes() -> Vec<NoteRecord> {
    DEFAULT_NOTES
        .iter()
        .map(
            |&(id, title, content, color_id, tag_id, in_trash)| NoteRecord {
                id: Some(id),
                title: title.to_string(),
                content: content.to_string(),
                color_id,
                tag_id,
                in_trash,
            },
        )
        .collect()
}
