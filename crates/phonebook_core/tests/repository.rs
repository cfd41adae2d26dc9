use phonebook_core::db::{open_db, open_db_in_memory};
use phonebook_core::{Color, Note, RepoError, Repository, Tag, NEW_NOTE_ID};
use rusqlite::Connection;
use std::collections::HashSet;
use std::path::Path;

async fn started(conn: Connection) -> Repository {
    let (repo, init) = Repository::start(conn).unwrap();
    init.wait().await.unwrap();
    repo
}

fn ids(notes: &[Note]) -> Vec<i64> {
    notes.iter().map(|note| note.id).collect()
}

fn count_rows(path: &Path, table: &str) -> i64 {
    let conn = open_db(path).unwrap();
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

#[tokio::test]
async fn empty_database_is_seeded_and_published() {
    let repo = started(open_db_in_memory().unwrap()).await;

    assert_eq!(ids(&repo.active_notes().borrow()), vec![1, 2, 3, 4, 5]);
    assert_eq!(ids(&repo.trashed_notes().borrow()), vec![6]);

    let mut colors = repo.colors();
    {
        let colors = colors.wait_for(|colors| colors.len() == 14).await.unwrap();
        assert_eq!(colors[0], Color::default());
    }

    let mut tags = repo.tags();
    let tags = tags.wait_for(|tags| !tags.is_empty()).await.unwrap();
    let names: Vec<_> = tags.iter().map(|tag| tag.name.as_str()).collect();
    assert_eq!(names, vec!["General", "School", "Home", "Work"]);
}

#[tokio::test]
async fn initialize_twice_creates_no_duplicates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("phonebook.sqlite3");

    let repo = started(open_db(&path).unwrap()).await;
    repo.initialize().await.unwrap();
    repo.initialize().await.unwrap();

    assert_eq!(count_rows(&path, "colors"), 14);
    assert_eq!(count_rows(&path, "tags"), 4);
    assert_eq!(count_rows(&path, "notes"), 6);
}

#[tokio::test]
async fn reopening_seeded_database_keeps_user_notes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("phonebook.sqlite3");

    let id = {
        let repo = started(open_db(&path).unwrap()).await;
        repo.insert_note(Note::new("Alice", "555-1234", Color::default(), Tag::default()))
            .await
            .unwrap()
    };

    let repo = started(open_db(&path).unwrap()).await;
    assert!(ids(&repo.active_notes().borrow()).contains(&id));
    assert_eq!(count_rows(&path, "notes"), 7);
}

#[tokio::test]
async fn inserted_note_appears_once_in_active_snapshot() {
    let repo = started(open_db_in_memory().unwrap()).await;
    let mut active = repo.active_notes();
    active.borrow_and_update();

    let note = Note::new("Alice", "555-1234", Color::default(), Tag::default());
    let id = repo.insert_note(note).await.unwrap();

    assert_ne!(id, NEW_NOTE_ID);
    assert!(active.has_changed().unwrap());
    let snapshot = active.borrow_and_update();
    let matching: Vec<_> = snapshot.iter().filter(|note| note.id == id).collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].title, "Alice");
    assert_eq!(matching[0].content, "555-1234");
    assert_eq!(matching[0].color, Color::default());
    assert_eq!(matching[0].tag, Tag::default());
    assert!(!matching[0].is_in_trash);
}

#[tokio::test]
async fn saving_existing_note_replaces_it() {
    let repo = started(open_db_in_memory().unwrap()).await;

    let mut note = repo.note(2).await.unwrap();
    note.title = "Dentist (new office)".to_string();
    note.tag = Tag {
        id: 4,
        name: "Work".to_string(),
    };
    assert_eq!(repo.insert_note(note.clone()).await.unwrap(), 2);

    assert_eq!(repo.note(2).await.unwrap(), note);
    let active = repo.active_notes().borrow().clone();
    assert_eq!(active.len(), 5);
    assert_eq!(active.iter().filter(|n| n.id == 2).count(), 1);
}

#[tokio::test]
async fn moving_note_to_trash_moves_it_between_snapshots() {
    let repo = started(open_db_in_memory().unwrap()).await;

    repo.move_note_to_trash(3).await.unwrap();

    assert!(!ids(&repo.active_notes().borrow()).contains(&3));
    assert_eq!(ids(&repo.trashed_notes().borrow()), vec![3, 6]);
    assert!(repo.note(3).await.unwrap().is_in_trash);
}

#[tokio::test]
async fn trashing_missing_note_fails_and_keeps_snapshots() {
    let repo = started(open_db_in_memory().unwrap()).await;
    let mut active = repo.active_notes();
    let mut trashed = repo.trashed_notes();
    let active_before = active.borrow_and_update().clone();
    let trashed_before = trashed.borrow_and_update().clone();

    let err = repo.move_note_to_trash(404).await.unwrap_err();

    assert!(matches!(err, RepoError::NotFound(404)));
    assert!(!active.has_changed().unwrap());
    assert!(!trashed.has_changed().unwrap());
    assert_eq!(*active.borrow(), active_before);
    assert_eq!(*trashed.borrow(), trashed_before);
}

#[tokio::test]
async fn snapshots_partition_the_notes_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("phonebook.sqlite3");
    let repo = started(open_db(&path).unwrap()).await;

    for idx in 0..4 {
        let id = repo
            .insert_note(Note::new(
                format!("Contact {idx}"),
                format!("555-01{idx:02}"),
                Color::default(),
                Tag::default(),
            ))
            .await
            .unwrap();
        if idx % 2 == 0 {
            repo.move_note_to_trash(id).await.unwrap();
        }
    }
    repo.move_note_to_trash(1).await.unwrap();

    let active: HashSet<_> = ids(&repo.active_notes().borrow()).into_iter().collect();
    let trashed: HashSet<_> = ids(&repo.trashed_notes().borrow()).into_iter().collect();
    assert!(active.is_disjoint(&trashed));

    let conn = open_db(&path).unwrap();
    let mut stmt = conn.prepare("SELECT id FROM notes;").unwrap();
    let stored: HashSet<i64> = stmt
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    let union: HashSet<_> = active.union(&trashed).copied().collect();
    assert_eq!(union, stored);
}

fn point_note_at_missing_color(path: &Path, note_id: i64) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(&format!(
        "PRAGMA foreign_keys = OFF; UPDATE notes SET color_id = 99 WHERE id = {note_id};"
    ))
    .unwrap();
}

fn stored_in_trash(path: &Path, note_id: i64) -> i64 {
    let conn = open_db(path).unwrap();
    conn.query_row(
        "SELECT in_trash FROM notes WHERE id = ?1;",
        [note_id],
        |row| row.get(0),
    )
    .unwrap()
}

#[tokio::test]
async fn dangling_color_reference_is_an_integrity_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("phonebook.sqlite3");
    let repo = started(open_db(&path).unwrap()).await;
    let mut active = repo.active_notes();
    let active_before = active.borrow_and_update().clone();

    point_note_at_missing_color(&path, 1);

    let err = repo.move_note_to_trash(2).await.unwrap_err();

    assert!(matches!(err, RepoError::Integrity(_)));
    assert!(err.to_string().contains("color 99"));
    assert!(!active.has_changed().unwrap());
    assert_eq!(*active.borrow(), active_before);
    // The trash flag write is rolled back with the failed refresh.
    assert_eq!(stored_in_trash(&path, 2), 0);
}

#[tokio::test]
async fn failed_refresh_rolls_back_inserted_note() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("phonebook.sqlite3");
    let repo = started(open_db(&path).unwrap()).await;
    let mut active = repo.active_notes();
    let mut trashed = repo.trashed_notes();
    active.borrow_and_update();
    trashed.borrow_and_update();

    point_note_at_missing_color(&path, 6);

    let err = repo
        .insert_note(Note::new("Alice", "555-1234", Color::default(), Tag::default()))
        .await
        .unwrap_err();

    assert!(matches!(err, RepoError::Integrity(_)));
    assert_eq!(count_rows(&path, "notes"), 6);
    assert!(!active.has_changed().unwrap());
    assert!(!trashed.has_changed().unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_inserts_are_all_published() {
    let repo = started(open_db_in_memory().unwrap()).await;

    let mut handles = Vec::new();
    for idx in 0..16 {
        let repo = repo.clone();
        handles.push(tokio::spawn(async move {
            repo.insert_note(Note::new(
                format!("Caller {idx}"),
                "555-0000",
                Color::default(),
                Tag::default(),
            ))
            .await
        }));
    }

    let mut inserted = HashSet::new();
    for handle in handles {
        inserted.insert(handle.await.unwrap().unwrap());
    }

    assert_eq!(inserted.len(), 16);
    let active: HashSet<_> = ids(&repo.active_notes().borrow()).into_iter().collect();
    assert!(inserted.is_subset(&active));
    assert_eq!(active.len(), 5 + 16);
}

#[test]
fn start_outside_runtime_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    assert!(matches!(
        Repository::start(conn),
        Err(RepoError::Runtime(_))
    ));
}
