//! Presence-based route guard.
//!
//! The guard only checks that an access token is stored. It never validates
//! the token; an expired token still passes.

use super::ACCESS_TOKEN_KEY;
use crate::storage::PersistentStorage;

/// Route that unauthenticated callers are sent to.
pub const LOGIN_ROUTE: &str = "/auth";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    Redirect(&'static str),
}

/// Decides whether a protected route may load.
pub fn check_access(storage: &PersistentStorage) -> RouteDecision {
    let token: Option<String> = storage.load(ACCESS_TOKEN_KEY, None);
    match token {
        Some(token) if !token.is_empty() => RouteDecision::Allow,
        _ => RouteDecision::Redirect(LOGIN_ROUTE),
    }
}
