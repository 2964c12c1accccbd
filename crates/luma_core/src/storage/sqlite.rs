//! SQLite-backed durable key-value backend.
//!
//! # Invariants
//! - Returned backends have migrations fully applied.
//! - All access goes through one connection guarded by a mutex.

use super::migrations::apply_migrations;
use super::{KeyValueBackend, StorageError, StorageResult};
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Durable backend storing one row per key in `kv_entries`.
#[derive(Debug)]
pub struct SqliteBackend {
    conn: Mutex<Connection>,
}

impl SqliteBackend {
    /// Opens (creating if needed) a database file and applies migrations.
    ///
    /// # Side effects
    /// - Emits `storage_open` logging events with duration and status.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Self::bootstrap("file", || Connection::open(path))
    }

    /// Opens a private in-memory database and applies migrations.
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::bootstrap("memory", Connection::open_in_memory)
    }

    fn bootstrap(
        mode: &str,
        connect: impl FnOnce() -> rusqlite::Result<Connection>,
    ) -> StorageResult<Self> {
        let started_at = Instant::now();
        info!("event=storage_open module=storage status=start mode={mode}");

        let result = connect()
            .map_err(StorageError::from)
            .and_then(|mut conn| {
                conn.busy_timeout(Duration::from_secs(5))?;
                apply_migrations(&mut conn)?;
                Ok(conn)
            });

        match result {
            Ok(conn) => {
                info!(
                    "event=storage_open module=storage status=ok mode={mode} duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(Self {
                    conn: Mutex::new(conn),
                })
            }
            Err(err) => {
                error!(
                    "event=storage_open module=storage status=error mode={mode} duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                Err(err)
            }
        }
    }
}

impl KeyValueBackend for SqliteBackend {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        let value = conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, strftime('%s', 'now') * 1000)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        conn.execute("DELETE FROM kv_entries WHERE key = ?1;", [key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::SqliteBackend;
    use crate::storage::migrations::{current_user_version, latest_version};
    use crate::storage::KeyValueBackend;

    #[test]
    fn open_in_memory_applies_latest_migration() {
        let backend = SqliteBackend::open_in_memory().unwrap();
        let conn = backend.conn.lock().unwrap();
        assert_eq!(current_user_version(&conn).unwrap(), latest_version());
    }

    #[test]
    fn set_item_replaces_previous_value() {
        let backend = SqliteBackend::open_in_memory().unwrap();
        backend.set_item("k", "1").unwrap();
        backend.set_item("k", "2").unwrap();
        assert_eq!(backend.get_item("k").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn remove_missing_key_is_not_an_error() {
        let backend = SqliteBackend::open_in_memory().unwrap();
        backend.remove_item("never-set").unwrap();
        assert_eq!(backend.get_item("never-set").unwrap(), None);
    }
}
