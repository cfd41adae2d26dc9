//! Schema migrations for the phonebook tables.
//!
//! Pending scripts run in version order inside one transaction; any failure
//! rolls back every script of the batch and leaves `user_version` untouched.

use crate::db::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
pub(crate) struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "phonebook_tables",
    sql: include_str!("0001_init.sql"),
}];

/// Returns the latest migration version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Brings the connection's schema up to `latest_version()`.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    run(conn, MIGRATIONS)
}

fn run(conn: &mut Connection, migrations: &[Migration]) -> DbResult<()> {
    let on_disk: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let latest = migrations.last().map_or(0, |migration| migration.version);
    if on_disk > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: on_disk,
            latest_supported: latest,
        });
    }

    let tx = conn.transaction()?;
    for migration in migrations.iter().filter(|m| m.version > on_disk) {
        let applied = tx.execute_batch(migration.sql).and_then(|()| {
            tx.pragma_update(None, "user_version", migration.version)
        });
        if let Err(source) = applied {
            error!(
                "event=db_migrate module=db status=error version={} name={} error={}",
                migration.version, migration.name, source
            );
            return Err(DbError::Migration {
                version: migration.version,
                name: migration.name,
                source,
            });
        }
        info!(
            "event=db_migrate module=db status=ok version={} name={}",
            migration.version, migration.name
        );
    }
    tx.commit()?;
    Ok(())
}
