//! Record stores: one persisted collection per entity type.
//!
//! # Responsibility
//! - Provide insert and full-scan read APIs for colors, tags and notes.
//! - Keep SQL details inside the persistence boundary.
//! - Republish a table's rows to its change feed after every write.
//!
//! # Invariants
//! - Rows are keyed by a store-generated integer id.
//! - `insert` is insert-or-replace by id; a record without id gets a fresh one.
//! - Read paths reject invalid persisted rows instead of masking them.

use crate::db::DbError;
use crate::model::RecordId;
use std::error::Error;
use std::fmt::{Display, Formatter};
use tokio::sync::watch;

pub mod feed;
pub mod records;
mod sqlite;

pub use feed::StoreFeed;
pub use records::{ColorRecord, NoteRecord, TableRecord, TagRecord};
pub use sqlite::SqliteStore;

pub type StoreResult<T> = Result<T, StoreError>;

pub type ColorStore<'conn> = SqliteStore<'conn, ColorRecord>;
pub type TagStore<'conn> = SqliteStore<'conn, TagRecord>;
pub type NoteStore<'conn> = SqliteStore<'conn, NoteRecord>;

/// Store error for record persistence and query operations.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    NotFound { table: &'static str, id: RecordId },
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { table, id } => write!(f, "{table} row not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Query(value))
    }
}

/// Persistence contract for one entity type.
pub trait RecordStore {
    type Record;

    /// Inserts or replaces one record and returns its id.
    fn insert(&self, record: &Self::Record) -> StoreResult<RecordId>;
    /// Inserts or replaces all records in one transaction.
    fn insert_all(&self, records: &[Self::Record]) -> StoreResult<()>;
    /// Live view of the table; receives the full row set after every write.
    fn get_all(&self) -> watch::Receiver<Vec<Self::Record>>;
    /// Reads the full table ordered by id.
    fn get_all_sync(&self) -> StoreResult<Vec<Self::Record>>;
    /// Reads one record, failing with `StoreError::NotFound` when absent.
    fn find_by_id_sync(&self, id: RecordId) -> StoreResult<Self::Record>;
    fn is_empty(&self) -> StoreResult<bool>;
}
