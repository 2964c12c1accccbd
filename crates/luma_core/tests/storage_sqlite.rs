use luma_core::storage::migrations::latest_version;
use luma_core::store::TASKS_KEY;
use luma_core::{EntityStore, PersistentStorage, SqliteBackend, StorageError, TaskPatch};
use rusqlite::Connection;

#[test]
fn store_survives_reopening_the_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("luma.sqlite3");

    let (task_id, project_id) = {
        let storage = PersistentStorage::new(SqliteBackend::open(&path).unwrap());
        let mut store = EntityStore::load(storage);
        let project = store.create_project("Launch", "Q1 launch");
        let task = store.create_task(
            "Draft plan",
            "",
            Some("2024-01-10".to_string()),
            Some(project.id.clone()),
        );
        store.update_task(&task.id, TaskPatch::completed(true));
        (task.id, project.id)
    };

    let storage = PersistentStorage::new(SqliteBackend::open(&path).unwrap());
    let store = EntityStore::load(storage);
    let task = store.get_task_by_id(&task_id).unwrap();
    assert!(task.completed);
    assert_eq!(task.project_id.as_deref(), Some(project_id.as_str()));
    assert!(store.get_project_by_id(&project_id).is_some());
}

#[test]
fn rows_hold_json_encoded_collections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("luma.sqlite3");
    {
        let mut store = EntityStore::load(PersistentStorage::new(SqliteBackend::open(&path).unwrap()));
        store.create_task("json", "", None, None);
    }

    let conn = Connection::open(&path).unwrap();
    let raw: String = conn
        .query_row(
            "SELECT value FROM kv_entries WHERE key = ?1",
            [TASKS_KEY],
            |row| row.get(0),
        )
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value[0]["title"], "json");
    assert_eq!(value[0]["completed"], false);
}

#[test]
fn newer_schema_version_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");
    {
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version() + 1))
            .unwrap();
    }

    let err = SqliteBackend::open(&path).unwrap_err();
    assert!(matches!(
        err,
        StorageError::UnsupportedSchemaVersion { db_version, .. } if db_version == latest_version() + 1
    ));
}
