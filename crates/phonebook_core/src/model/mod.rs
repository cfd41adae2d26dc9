//! Domain model handed to view-state holders and UI collaborators.
//!
//! # Responsibility
//! - Define the fully-resolved color, tag and note values.
//! - Own the identifier type and the "not yet persisted" sentinel.
//!
//! # Invariants
//! - A note embeds its color and tag by value, never by id.
//! - Deletion is a trash flag, never a physical row removal.

pub mod color;
pub mod note;
pub mod tag;

/// Identifier generated by the store for every persisted row.
pub type RecordId = i64;

/// Sentinel id carried by a note that has never been saved.
pub const NEW_NOTE_ID: RecordId = -1;
