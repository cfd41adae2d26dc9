//! SQLite storage bootstrap, schema migrations and default data.
//!
//! # Responsibility
//! - Open and configure the single SQLite connection used by the phonebook.
//! - Apply schema migrations in deterministic order.
//! - Own the fixed default colors, tags and notes seeded on first run.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Foreign keys are enforced on every returned connection; the
//!   notes -> colors/tags references depend on it.
//! - Stores must not read/write rows before migrations succeed.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;
pub mod seed;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening, configuring or migrating the phonebook database.
#[derive(Debug)]
pub enum DbError {
    /// The database file or in-memory handle could not be opened.
    Open(rusqlite::Error),
    /// A connection setting could not be applied.
    Pragma {
        name: &'static str,
        source: rusqlite::Error,
    },
    /// SQLite accepted `foreign_keys = ON` but reports it disabled.
    ForeignKeysUnavailable,
    /// One migration script failed; the whole batch was rolled back.
    Migration {
        version: u32,
        name: &'static str,
        source: rusqlite::Error,
    },
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Query failure raised by stores after bootstrap.
    Query(rusqlite::Error),
}

impl DbError {
    /// Stable code used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Open(_) => "db_open_failed",
            Self::Pragma { .. } => "db_pragma_failed",
            Self::ForeignKeysUnavailable => "db_foreign_keys_unavailable",
            Self::Migration { .. } => "db_migration_failed",
            Self::UnsupportedSchemaVersion { .. } => "db_schema_too_new",
            Self::Query(_) => "db_query_failed",
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open(err) => write!(f, "cannot open phonebook database: {err}"),
            Self::Pragma { name, source } => write!(f, "cannot apply pragma `{name}`: {source}"),
            Self::ForeignKeysUnavailable => {
                write!(f, "sqlite build does not enforce foreign keys")
            }
            Self::Migration {
                version,
                name,
                source,
            } => write!(f, "migration {version} ({name}) failed: {source}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "phonebook schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::Query(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open(err) | Self::Query(err) => Some(err),
            Self::Pragma { source, .. } | Self::Migration { source, .. } => Some(source),
            Self::ForeignKeysUnavailable | Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Query(value)
    }
}
