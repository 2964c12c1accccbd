//! Application context wiring storage, store, identity and theme.
//!
//! Built once at startup and handed to every caller that needs it.

use crate::auth::IdentityService;
use crate::config::AppConfig;
use crate::storage::{PersistentStorage, SqliteBackend};
use crate::store::EntityStore;
use crate::theme::ThemeSettings;
use log::warn;

/// Everything a front end needs, sharing one storage backend.
pub struct LumaContext {
    pub storage: PersistentStorage,
    pub store: EntityStore,
    pub identity: IdentityService,
    pub theme: ThemeSettings,
}

impl LumaContext {
    /// Opens the durable store at `config.data_path`.
    ///
    /// If the store cannot be opened the context runs with unavailable
    /// storage: data lives in memory only for this process.
    pub fn bootstrap(config: &AppConfig) -> Self {
        let storage = match SqliteBackend::open(&config.data_path) {
            Ok(backend) => PersistentStorage::new(backend),
            Err(err) => {
                warn!(
                    "event=context_bootstrap module=core status=error error_code=storage_unavailable path={} error={err}",
                    config.data_path.display()
                );
                PersistentStorage::unavailable()
            }
        };
        Self::with_storage(config, storage)
    }

    /// Builds the context over an existing storage adapter.
    pub fn with_storage(config: &AppConfig, storage: PersistentStorage) -> Self {
        Self {
            store: EntityStore::load(storage.clone()),
            identity: IdentityService::from_config(&config.identity, storage.clone()),
            theme: ThemeSettings::new(storage.clone()),
            storage,
        }
    }
}
