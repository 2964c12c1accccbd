//! Provider-neutral identity seam.

use super::error::ProviderError;
use crate::model::{now, Timestamp};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};

/// Proof of authentication: three bearer tokens plus access-token expiry.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_token: String,
    pub id_token: String,
    pub refresh_token: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: Timestamp,
}

impl Session {
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(now())
    }

    pub fn is_valid_at(&self, at: Timestamp) -> bool {
        at < self.expires_at
    }
}

// Tokens are bearer credentials; keep them out of logs and panic messages.
impl Debug for Session {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("id_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Result of one username/password exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Authenticated(Session),
    /// The provider requires a new password before issuing tokens.
    NewPasswordRequired,
}

/// Hosted identity provider client.
///
/// Implementations own their notion of the "current user" (the identity
/// cached by the last successful sign-in).
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Performs one username/password authentication exchange.
    async fn authenticate(&self, username: &str, password: &str)
        -> Result<AuthOutcome, ProviderError>;

    /// Registers a new identity with `email` and `name` attributes.
    async fn sign_up(&self, name: &str, email: &str, password: &str) -> Result<(), ProviderError>;

    /// Username of the locally cached identity, if any. Never hits the network.
    fn current_user(&self) -> Option<String>;

    /// Current session for `username`, refreshing it when needed.
    ///
    /// A returned session may still be invalid; callers check validity.
    async fn get_session(&self, username: &str) -> Result<Option<Session>, ProviderError>;

    /// Invalidates the identity provider-side and drops the local cache.
    async fn sign_out(&self, username: &str) -> Result<(), ProviderError>;
}
