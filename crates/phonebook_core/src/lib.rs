//! Core data layer for the phonebook notes app.
//! Owns persistence, record/domain mapping and observable note snapshots.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use config::{ConfigError, CoreConfig};
pub use logging::{
    default_log_level, init_from_config, init_logging, logging_status, LoggingError,
};
pub use model::color::Color;
pub use model::note::Note;
pub use model::tag::Tag;
pub use model::{RecordId, NEW_NOTE_ID};
pub use repo::mapper::MapperError;
pub use repo::note_repo::{Initialization, RepoError, RepoResult, Repository};
pub use service::notes_view_state::NotesViewState;
pub use store::{RecordStore, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
