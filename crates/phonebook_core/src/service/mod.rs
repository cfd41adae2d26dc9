//! View-state services consumed by UI collaborators.
//!
//! # Responsibility
//! - Hold per-screen state on top of repository snapshots.
//! - Keep UI layers decoupled from storage details.

pub mod notes_view_state;
