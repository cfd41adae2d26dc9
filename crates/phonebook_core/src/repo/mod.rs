//! Repository layer: record/domain mapping and snapshot publication.
//!
//! # Responsibility
//! - Translate persisted rows into resolved domain notes.
//! - Serialize mutations and publish consistent note snapshots.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`, `Integrity`) in
//!   addition to store transport errors.

pub mod mapper;
pub mod note_repo;
