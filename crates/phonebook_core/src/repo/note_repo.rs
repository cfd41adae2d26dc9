//! Note repository: the single access point for reading and mutating notes.
//!
//! # Responsibility
//! - Seed default colors, tags and notes into empty tables on startup.
//! - Publish active/trashed note snapshots and mapped color/tag views.
//! - Run store I/O on the blocking pool, off the caller's task.
//!
//! # Invariants
//! - Every mutation-and-refresh sequence holds the connection lock for its
//!   whole duration, so sequences never interleave.
//! - A note write, the re-scan and the mapping of both partitions share one
//!   transaction. Any failure rolls the write back.
//! - Feeds and snapshots are published only after commit, and before the
//!   mutation future resolves.
//! - Every refresh is a full re-scan of all three tables. Fine for a local
//!   phonebook; larger data sets would need incremental invalidation.

use crate::db::seed::{default_colors, default_notes, default_tags};
use crate::model::color::Color;
use crate::model::note::Note;
use crate::model::tag::Tag;
use crate::model::RecordId;
use crate::repo::mapper::{
    index_colors, index_tags, map_colors, map_notes, map_tags, to_persisted_note, MapperError,
};
use crate::store::{
    ColorRecord, ColorStore, NoteRecord, NoteStore, RecordStore, SqliteStore, StoreError,
    StoreFeed, TagRecord, TagStore,
};
use log::{debug, error, info};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error surfaced to view-state holders.
#[derive(Debug)]
pub enum RepoError {
    /// Persistence-layer failure.
    Store(StoreError),
    /// A note references a color or tag that does not exist.
    Integrity(MapperError),
    /// Target note does not exist.
    NotFound(RecordId),
    /// Missing runtime, failed blocking task or poisoned lock.
    Runtime(String),
}

impl RepoError {
    /// Stable code used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Store(_) => "store_failed",
            Self::Integrity(_) => "integrity_violation",
            Self::NotFound(_) => "note_not_found",
            Self::Runtime(_) => "runtime_failed",
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Integrity(err) => write!(f, "data integrity violation: {err}"),
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::Runtime(message) => write!(f, "repository runtime failure: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Integrity(err) => Some(err),
            Self::NotFound(_) | Self::Runtime(_) => None,
        }
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound { id, .. } => Self::NotFound(id),
            other => Self::Store(other),
        }
    }
}

impl From<MapperError> for RepoError {
    fn from(value: MapperError) -> Self {
        Self::Integrity(value)
    }
}

/// Completion signal of the startup bootstrap spawned by `Repository::start`.
pub struct Initialization {
    handle: JoinHandle<RepoResult<()>>,
}

impl Initialization {
    /// Waits for seeding and the first snapshot refresh to finish.
    pub async fn wait(self) -> RepoResult<()> {
        self.handle
            .await
            .map_err(|err| RepoError::Runtime(format!("initialization task failed: {err}")))?
    }
}

/// Cloneable handle to the note repository; clones share state.
#[derive(Clone)]
pub struct Repository {
    inner: Arc<Shared>,
}

struct Shared {
    conn: Mutex<Connection>,
    color_feed: StoreFeed<ColorRecord>,
    tag_feed: StoreFeed<TagRecord>,
    note_feed: StoreFeed<NoteRecord>,
    active_notes: watch::Sender<Vec<Note>>,
    trashed_notes: watch::Sender<Vec<Note>>,
    colors: watch::Receiver<Vec<Color>>,
    tags: watch::Receiver<Vec<Tag>>,
}

impl Repository {
    /// Takes ownership of a migrated connection and spawns the bootstrap.
    ///
    /// # Errors
    /// - `RepoError::Runtime` when called outside a Tokio runtime.
    pub fn start(conn: Connection) -> RepoResult<(Self, Initialization)> {
        let runtime = Handle::try_current().map_err(|err| {
            RepoError::Runtime(format!("repository requires a tokio runtime: {err}"))
        })?;

        let color_feed = StoreFeed::new();
        let tag_feed = StoreFeed::new();
        let colors = spawn_mapped(&runtime, color_feed.subscribe(), map_colors);
        let tags = spawn_mapped(&runtime, tag_feed.subscribe(), map_tags);
        let (active_notes, _) = watch::channel(Vec::new());
        let (trashed_notes, _) = watch::channel(Vec::new());

        let repository = Self {
            inner: Arc::new(Shared {
                conn: Mutex::new(conn),
                color_feed,
                tag_feed,
                note_feed: StoreFeed::new(),
                active_notes,
                trashed_notes,
                colors,
                tags,
            }),
        };

        let bootstrap = repository.clone();
        let handle = runtime.spawn(async move { bootstrap.initialize().await });
        Ok((repository, Initialization { handle }))
    }

    /// Seeds every empty table with defaults, then refreshes snapshots.
    ///
    /// Runs automatically from `start`; calling it again on a seeded
    /// database only republishes current state.
    pub async fn initialize(&self) -> RepoResult<()> {
        self.with_connection("repo_init", |shared, conn| {
            seed_if_empty("colors", &shared.color_store(conn), default_colors)?;
            seed_if_empty("tags", &shared.tag_store(conn), default_tags)?;
            seed_if_empty("notes", &shared.note_store(conn), default_notes)?;

            shared.color_store(conn).publish()?;
            shared.tag_store(conn).publish()?;
            let scan = shared.scan(conn)?;
            shared.publish(scan);
            Ok(())
        })
        .await
    }

    /// Saves a note and returns its id.
    ///
    /// A note carrying `NEW_NOTE_ID` is inserted under a fresh id; any other
    /// id replaces the existing row.
    pub async fn insert_note(&self, note: Note) -> RepoResult<RecordId> {
        self.with_connection("note_insert", move |shared, conn| {
            shared.mutate(conn, |store| Ok(store.insert(&to_persisted_note(&note))?))
        })
        .await
    }

    /// Flags one note as trashed.
    ///
    /// # Errors
    /// - `RepoError::NotFound` when no note has `note_id`; nothing is written
    ///   and no snapshot is published.
    /// - `RepoError::Integrity` when any stored note is dangling; the flag
    ///   change is rolled back.
    pub async fn move_note_to_trash(&self, note_id: RecordId) -> RepoResult<()> {
        self.with_connection("note_trash", move |shared, conn| {
            shared.mutate(conn, |store| {
                let record = store.find_by_id_sync(note_id)?;
                store.insert(&NoteRecord {
                    in_trash: true,
                    ..record
                })?;
                Ok(())
            })
        })
        .await
    }

    /// Reads one fully-resolved note.
    pub async fn note(&self, note_id: RecordId) -> RepoResult<Note> {
        self.with_connection("note_get", move |shared, conn| {
            let record = shared.note_store(conn).find_by_id_sync(note_id)?;
            let colors = index_colors(shared.color_store(conn).get_all_sync()?);
            let tags = index_tags(shared.tag_store(conn).get_all_sync()?);
            map_notes(&[record], &colors, &tags)?
                .pop()
                .ok_or(RepoError::NotFound(note_id))
        })
        .await
    }

    /// Live snapshot of notes not in the trash.
    pub fn active_notes(&self) -> watch::Receiver<Vec<Note>> {
        self.inner.active_notes.subscribe()
    }

    /// Live snapshot of trashed notes.
    pub fn trashed_notes(&self) -> watch::Receiver<Vec<Note>> {
        self.inner.trashed_notes.subscribe()
    }

    pub fn colors(&self) -> watch::Receiver<Vec<Color>> {
        self.inner.colors.clone()
    }

    pub fn tags(&self) -> watch::Receiver<Vec<Tag>> {
        self.inner.tags.clone()
    }

    async fn with_connection<T, F>(&self, event: &'static str, op: F) -> RepoResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Shared, &Connection) -> RepoResult<T> + Send + 'static,
    {
        let started_at = Instant::now();
        debug!("event={event} module=repo status=start");

        let shared = Arc::clone(&self.inner);
        let result = tokio::task::spawn_blocking(move || {
            let conn = shared
                .conn
                .lock()
                .map_err(|_| RepoError::Runtime("connection lock poisoned".to_string()))?;
            op(shared.as_ref(), &*conn)
        })
        .await
        .map_err(|err| RepoError::Runtime(format!("{event} task failed: {err}")))
        .and_then(|result| result);

        match &result {
            Ok(_) => info!(
                "event={event} module=repo status=ok duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event={event} module=repo status=error duration_ms={} error_code={} error={}",
                started_at.elapsed().as_millis(),
                err.code(),
                err
            ),
        }
        result
    }
}

impl Shared {
    fn color_store<'a>(&'a self, conn: &'a Connection) -> ColorStore<'a> {
        SqliteStore::new(conn, &self.color_feed)
    }

    fn tag_store<'a>(&'a self, conn: &'a Connection) -> TagStore<'a> {
        SqliteStore::new(conn, &self.tag_feed)
    }

    fn note_store<'a>(&'a self, conn: &'a Connection) -> NoteStore<'a> {
        SqliteStore::new(conn, &self.note_feed)
    }

    /// Runs one note write, re-scans and commits, then publishes.
    ///
    /// On any error the transaction is dropped uncommitted and nothing is
    /// published.
    fn mutate<T>(
        &self,
        conn: &Connection,
        write: impl FnOnce(&NoteStore<'_>) -> RepoResult<T>,
    ) -> RepoResult<T> {
        let tx = conn.unchecked_transaction().map_err(StoreError::from)?;
        let value = write(&SqliteStore::deferred(&tx, &self.note_feed))?;
        let scan = self.scan(&tx)?;
        tx.commit().map_err(StoreError::from)?;

        self.publish(scan);
        Ok(value)
    }

    /// Reads all tables and maps both note partitions. Publishes nothing.
    fn scan(&self, conn: &Connection) -> RepoResult<Scan> {
        let colors = index_colors(self.color_store(conn).get_all_sync()?);
        let tags = index_tags(self.tag_store(conn).get_all_sync()?);
        let records = self.note_store(conn).get_all_sync()?;
        let (trashed, active): (Vec<_>, Vec<_>) =
            records.iter().cloned().partition(|record| record.in_trash);

        let active = map_notes(&active, &colors, &tags)?;
        let trashed = map_notes(&trashed, &colors, &tags)?;
        Ok(Scan {
            records,
            active,
            trashed,
        })
    }

    fn publish(&self, scan: Scan) {
        debug!(
            "event=snapshot_refresh module=repo status=ok active={} trashed={}",
            scan.active.len(),
            scan.trashed.len()
        );
        self.note_feed.publish(scan.records);
        self.active_notes.send_replace(scan.active);
        self.trashed_notes.send_replace(scan.trashed);
    }
}

/// Consistent read of the notes table with both partitions mapped.
struct Scan {
    records: Vec<NoteRecord>,
    active: Vec<Note>,
    trashed: Vec<Note>,
}

fn seed_if_empty<R, S>(
    table: &'static str,
    store: &S,
    defaults: fn() -> Vec<R>,
) -> RepoResult<()>
where
    S: RecordStore<Record = R>,
{
    if !store.is_empty()? {
        debug!("event=db_seed module=repo status=skipped table={table}");
        return Ok(());
    }

    let rows = defaults();
    store.insert_all(&rows)?;
    info!(
        "event=db_seed module=repo status=ok table={table} rows={}",
        rows.len()
    );
    Ok(())
}

/// Forwards a store feed through `map` into a new watch cell.
///
/// The task ends once the feed's sender (owned by `Shared`) is dropped.
fn spawn_mapped<R, T>(
    runtime: &Handle,
    mut source: watch::Receiver<Vec<R>>,
    map: fn(&[R]) -> Vec<T>,
) -> watch::Receiver<Vec<T>>
where
    R: Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    let initial = {
        let rows = source.borrow_and_update();
        map(&rows)
    };
    let (sender, receiver) = watch::channel(initial);
    runtime.spawn(async move {
        while source.changed().await.is_ok() {
            let mapped = {
                let rows = source.borrow_and_update();
                map(&rows)
            };
            if sender.send(mapped).is_err() {
                break;
            }
        }
    });
    receiver
}
