//! Generic SQLite implementation of `RecordStore`.

use crate::model::RecordId;
use crate::store::{RecordStore, StoreError, StoreFeed, StoreResult, TableRecord};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use tokio::sync::watch;

/// SQLite-backed store for one `TableRecord` type.
///
/// Borrowed per operation from the connection owner, together with the
/// table's change feed.
pub struct SqliteStore<'conn, R: TableRecord> {
    conn: &'conn Connection,
    feed: &'conn StoreFeed<R>,
    publish_on_write: bool,
}

impl<'conn, R: TableRecord> SqliteStore<'conn, R> {
    /// Constructs a store from a migrated/ready connection.
    pub fn new(conn: &'conn Connection, feed: &'conn StoreFeed<R>) -> Self {
        Self {
            conn,
            feed,
            publish_on_write: true,
        }
    }

    /// Store whose writes leave the feed alone.
    ///
    /// Used inside an open transaction: rows read before commit must not
    /// reach subscribers, so the caller publishes once the commit succeeds.
    pub fn deferred(conn: &'conn Connection, feed: &'conn StoreFeed<R>) -> Self {
        Self {
            conn,
            feed,
            publish_on_write: false,
        }
    }

    /// Re-reads the table and replaces the feed's current rows.
    pub fn publish(&self) -> StoreResult<()> {
        self.feed.publish(self.get_all_sync()?);
        Ok(())
    }
}

impl<R: TableRecord> RecordStore for SqliteStore<'_, R> {
    type Record = R;

    fn insert(&self, record: &R) -> StoreResult<RecordId> {
        let id = insert_row(self.conn, record)?;
        if self.publish_on_write {
            self.publish()?;
        }
        Ok(id)
    }

    fn insert_all(&self, records: &[R]) -> StoreResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        for record in records {
            insert_row(&tx, record)?;
        }
        tx.commit()?;
        if self.publish_on_write {
            self.publish()?;
        }
        Ok(())
    }

    fn get_all(&self) -> watch::Receiver<Vec<R>> {
        self.feed.subscribe()
    }

    fn get_all_sync(&self) -> StoreResult<Vec<R>> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("{} ORDER BY id ASC;", select_sql::<R>()))?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(R::from_row(row)?);
        }
        Ok(records)
    }

    fn find_by_id_sync(&self, id: RecordId) -> StoreResult<R> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("{} WHERE id = ?1;", select_sql::<R>()))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return R::from_row(row);
        }

        Err(StoreError::NotFound {
            table: R::TABLE,
            id,
        })
    }

    fn is_empty(&self) -> StoreResult<bool> {
        let exists: i64 = self.conn.query_row(
            &format!("SELECT EXISTS(SELECT 1 FROM {});", R::TABLE),
            [],
            |row| row.get(0),
        )?;
        Ok(exists == 0)
    }
}

fn insert_row<R: TableRecord>(conn: &Connection, record: &R) -> StoreResult<RecordId> {
    let mut values = Vec::with_capacity(R::COLUMNS.len() + 1);
    values.push(record.id().map_or(Value::Null, Value::Integer));
    values.extend(record.values());

    let mut stmt = conn.prepare_cached(&upsert_sql::<R>())?;
    stmt.execute(params_from_iter(values))?;

    Ok(match record.id() {
        Some(id) => id,
        None => conn.last_insert_rowid(),
    })
}

fn select_sql<R: TableRecord>() -> String {
    format!("SELECT id, {} FROM {}", R::COLUMNS.join(", "), R::TABLE)
}

fn upsert_sql<R: TableRecord>() -> String {
    let placeholders = (1..=R::COLUMNS.len() + 1)
        .map(|index| format!("?{index}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT OR REPLACE INTO {} (id, {}) VALUES ({placeholders});",
        R::TABLE,
        R::COLUMNS.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::{upsert_sql, SqliteStore};
    use crate::db::open_db_in_memory;
    use crate::db::seed::{default_colors, default_tags};
    use crate::store::{
        ColorRecord, NoteRecord, RecordStore, StoreError, StoreFeed, TagRecord,
    };

    fn note(id: Option<i64>, title: &str) -> NoteRecord {
        NoteRecord {
            id,
            title: title.to_string(),
            content: "555-0000".to_string(),
            color_id: 1,
            tag_id: 1,
            in_trash: false,
        }
    }

    #[test]
    fn upsert_sql_binds_id_and_all_columns() {
        assert_eq!(
            upsert_sql::<TagRecord>(),
            "INSERT OR REPLACE INTO tags (id, name) VALUES (?1, ?2);"
        );
    }

    #[test]
    fn insert_without_id_generates_one_and_replace_keeps_it() {
        let conn = open_db_in_memory().unwrap();
        let color_feed = StoreFeed::<ColorRecord>::new();
        let tag_feed = StoreFeed::<TagRecord>::new();
        SqliteStore::new(&conn, &color_feed)
            .insert_all(&default_colors())
            .unwrap();
        SqliteStore::new(&conn, &tag_feed)
            .insert_all(&default_tags())
            .unwrap();

        let note_feed = StoreFeed::<NoteRecord>::new();
        let notes = SqliteStore::new(&conn, &note_feed);
        let id = notes.insert(&note(None, "Alice")).unwrap();
        assert!(id > 0);

        let mut updated = notes.find_by_id_sync(id).unwrap();
        updated.title = "Alice B.".to_string();
        assert_eq!(notes.insert(&updated).unwrap(), id);

        let all = notes.get_all_sync().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title, "Alice B.");
    }

    #[test]
    fn find_by_id_reports_missing_row() {
        let conn = open_db_in_memory().unwrap();
        let feed = StoreFeed::<NoteRecord>::new();
        let err = SqliteStore::new(&conn, &feed)
            .find_by_id_sync(42)
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::NotFound {
                table: "notes",
                id: 42
            }
        ));
    }

    #[test]
    fn writes_republish_feed() {
        let conn = open_db_in_memory().unwrap();
        let feed = StoreFeed::<TagRecord>::new();
        let store = SqliteStore::new(&conn, &feed);
        let receiver = store.get_all();
        assert!(store.is_empty().unwrap());

        store.insert_all(&default_tags()).unwrap();

        assert!(!store.is_empty().unwrap());
        assert_eq!(receiver.borrow().len(), 4);
    }

    #[test]
    fn deferred_store_writes_without_publishing() {
        let conn = open_db_in_memory().unwrap();
        let feed = StoreFeed::<TagRecord>::new();
        let receiver = feed.subscribe();

        let store = SqliteStore::deferred(&conn, &feed);
        store.insert_all(&default_tags()).unwrap();

        assert_eq!(store.get_all_sync().unwrap().len(), 4);
        assert!(receiver.borrow().is_empty());
        assert!(!receiver.has_changed().unwrap());

        store.publish().unwrap();
        assert_eq!(receiver.borrow().len(), 4);
    }

    #[test]
    fn invalid_hex_is_rejected_on_read() {
        let conn = open_db_in_memory().unwrap();
        conn.execute(
            "INSERT INTO colors (id, name, hex) VALUES (1, 'Broken', 'red');",
            [],
        )
        .unwrap();

        let feed = StoreFeed::<ColorRecord>::new();
        let err = SqliteStore::new(&conn, &feed).get_all_sync().unwrap_err();
        assert!(matches!(err, StoreError::InvalidData(_)));
    }
}
