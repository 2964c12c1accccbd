//! Core domain logic for Luma.
//! Tasks, projects and notes persisted locally, plus the identity session
//! adapter and theme settings shared by every front end.

pub mod auth;
pub mod calendar;
pub mod config;
pub mod context;
pub mod logging;
pub mod model;
pub mod storage;
pub mod store;
pub mod theme;

pub use auth::guard::{check_access, RouteDecision};
pub use auth::{
    AuthError, AuthOutcome, CognitoProvider, IdentityProvider, IdentityService, IdentityState,
    ProviderError, Session,
};
pub use calendar::WeekView;
pub use config::{AppConfig, IdentityConfig};
pub use context::LumaContext;
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::note::{Note, NotePatch};
pub use model::project::{Project, ProjectPatch};
pub use model::task::{Task, TaskPatch};
pub use model::EntityId;
pub use storage::{
    KeyValueBackend, MemoryBackend, PersistentStorage, SqliteBackend, StorageError,
    StorageResult,
};
pub use store::{DaySchedule, EntityStore};
pub use theme::{Theme, ThemeId, ThemeMode, ThemeSettings};

/// Minimal health-check API for front-end wiring probes.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
