//! Persistent key-value adapter over a per-origin durable store.
//!
//! # Responsibility
//! - Load and save JSON-encoded values under flat string keys.
//! - Hide backend availability and failures from callers.
//!
//! # Invariants
//! - `load` never fails: absent, unreadable or malformed values yield the
//!   caller-supplied default.
//! - `save` and `remove` never fail: an unavailable backend is skipped and
//!   backend errors are logged, not propagated.
//! - Clones of one adapter share the same backend.
//!
//! # See also
//! - `crate::store` and `crate::auth` own disjoint key subsets.

mod memory;
pub mod migrations;
mod sqlite;

pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;

use log::{debug, error, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type StorageResult<T> = Result<T, StorageError>;

/// Backend failure. Only surfaced by explicit backend construction; the
/// adapter swallows it everywhere else.
#[derive(Debug)]
pub enum StorageError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Write rejected by the backend (quota, read-only medium).
    Rejected(String),
    /// A previous holder of the backend lock panicked.
    Poisoned,
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "storage schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::Rejected(reason) => write!(f, "storage write rejected: {reason}"),
            Self::Poisoned => write!(f, "storage lock poisoned"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Raw string storage behind the adapter.
pub trait KeyValueBackend: Send + Sync {
    /// Reads the raw value under `key`.
    fn get_item(&self, key: &str) -> StorageResult<Option<String>>;
    /// Writes the raw value under `key`, replacing any previous one.
    fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;
    /// Removes `key`. Removing a missing key is not an error.
    fn remove_item(&self, key: &str) -> StorageResult<()>;
}

/// Best-effort JSON adapter over an optional backend.
#[derive(Clone, Default)]
pub struct PersistentStorage {
    backend: Option<Arc<dyn KeyValueBackend>>,
}

impl PersistentStorage {
    /// Wraps a concrete backend.
    pub fn new(backend: impl KeyValueBackend + 'static) -> Self {
        Self {
            backend: Some(Arc::new(backend)),
        }
    }

    /// Wraps a backend shared with other owners.
    pub fn from_shared(backend: Arc<dyn KeyValueBackend>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// Adapter with no backend, as in a headless context.
    pub fn unavailable() -> Self {
        Self { backend: None }
    }

    /// Process-local adapter backed by [`MemoryBackend`].
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    /// Returns the value stored under `key`, or `default`.
    pub fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let Some(backend) = self.backend.as_ref() else {
            debug!("event=storage_load module=storage status=skip key={key} reason=unavailable");
            return default;
        };

        let raw = match backend.get_item(key) {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => return default,
            Err(err) => {
                warn!(
                    "event=storage_load module=storage status=error key={key} error_code=read_failed error={err}"
                );
                return default;
            }
        };

        match serde_json::from_str(raw.as_str()) {
            Ok(value) => value,
            Err(err) => {
                warn!(
                    "event=storage_load module=storage status=error key={key} error_code=decode_failed error={err}"
                );
                default
            }
        }
    }

    /// Serializes `value` under `key`.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let Some(backend) = self.backend.as_ref() else {
            debug!("event=storage_save module=storage status=skip key={key} reason=unavailable");
            return;
        };

        let encoded = match serde_json::to_string(value) {
            Ok(encoded) => encoded,
            Err(err) => {
                error!(
                    "event=storage_save module=storage status=error key={key} error_code=encode_failed error={err}"
                );
                return;
            }
        };

        if let Err(err) = backend.set_item(key, encoded.as_str()) {
            error!(
                "event=storage_save module=storage status=error key={key} error_code=write_failed error={err}"
            );
        }
    }

    /// Removes `key`.
    pub fn remove(&self, key: &str) {
        let Some(backend) = self.backend.as_ref() else {
            return;
        };
        if let Err(err) = backend.remove_item(key) {
            error!(
                "event=storage_remove module=storage status=error key={key} error_code=remove_failed error={err}"
            );
        }
    }
}
