//! Entity model for tasks, projects and notes.
//!
//! # Responsibility
//! - Define the persisted record shapes shared by the store and its callers.
//! - Define patch structures listing only the mutable fields of each entity.
//! - Own id allocation and timestamp stamping rules.
//!
//! # Invariants
//! - `id` and `created_at` are never reachable through a patch.
//! - `updated_at >= created_at`, and a fresh stamp never precedes the previous one.
//!
//! # See also
//! - `crate::store` for the operations that mutate these records.

pub mod note;
pub mod project;
pub mod task;

use time::OffsetDateTime;
use uuid::Uuid;

/// Opaque entity identifier, unique within its collection.
pub type EntityId = String;

/// RFC 3339 timestamp in UTC.
pub type Timestamp = OffsetDateTime;

/// Allocates a new opaque entity id.
///
/// `is_taken` lets the caller reject ids already present in its collection.
pub fn allocate_id(is_taken: impl Fn(&str) -> bool) -> EntityId {
    loop {
        let candidate = Uuid::new_v4().to_string();
        if !is_taken(candidate.as_str()) {
            return candidate;
        }
    }
}

/// Current wall-clock time in UTC.
pub fn now() -> Timestamp {
    OffsetDateTime::now_utc()
}

/// Returns a stamp for a mutation that happened after `previous`.
///
/// The wall clock may step backwards; the result is clamped so history stays
/// monotonic.
pub fn stamp_after(previous: Timestamp) -> Timestamp {
    now().max(previous)
}
