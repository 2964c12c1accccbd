//! Identity session service.
//!
//! Concurrent duplicate calls (two parallel `sign_in`s) are not coordinated:
//! the last writer wins on the stored keys. No timeout is applied here; a
//! hung provider call hangs the caller.

use super::cognito::CognitoProvider;
use super::error::AuthError;
use super::provider::{AuthOutcome, IdentityProvider, Session};
use super::{ACCESS_TOKEN_KEY, ID_TOKEN_KEY, REFRESH_TOKEN_KEY, SESSION_KEYS, USER_EMAIL_KEY};
use crate::config::IdentityConfig;
use crate::storage::PersistentStorage;
use log::{debug, error, info, warn};
use std::sync::{Arc, Mutex};

/// Caller-visible identity state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityState {
    /// No session check has completed yet in this process.
    Unknown,
    SignedIn,
    SignedOut,
}

/// Async identity operations plus synchronous token accessors.
pub struct IdentityService {
    provider: Option<Arc<dyn IdentityProvider>>,
    storage: PersistentStorage,
    state: Mutex<IdentityState>,
}

impl IdentityService {
    /// Service backed by `provider`.
    pub fn new(provider: Arc<dyn IdentityProvider>, storage: PersistentStorage) -> Self {
        Self {
            provider: Some(provider),
            storage,
            state: Mutex::new(IdentityState::Unknown),
        }
    }

    /// Degraded service: every provider-backed call fails with
    /// [`AuthError::NotConfigured`].
    pub fn not_configured(storage: PersistentStorage) -> Self {
        Self {
            provider: None,
            storage,
            state: Mutex::new(IdentityState::Unknown),
        }
    }

    /// Builds a Cognito-backed service, or a degraded one when `config`
    /// lacks pool/client identifiers or the HTTP client cannot be built.
    pub fn from_config(config: &IdentityConfig, storage: PersistentStorage) -> Self {
        if !config.is_configured() {
            warn!("event=auth_init module=auth status=skip reason=not_configured");
            return Self::not_configured(storage);
        }

        match CognitoProvider::new(config, storage.clone()) {
            Ok(provider) => {
                info!(
                    "event=auth_init module=auth status=ok provider=cognito region={}",
                    config.region
                );
                Self::new(Arc::new(provider), storage)
            }
            Err(err) => {
                error!("event=auth_init module=auth status=error error={err}");
                Self::not_configured(storage)
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    pub fn identity_state(&self) -> IdentityState {
        self.state
            .lock()
            .map_or(IdentityState::Unknown, |state| *state)
    }

    /// Authenticates `email`/`password` and stores the resulting tokens.
    ///
    /// # Errors
    /// - `NotConfigured` for a degraded service.
    /// - `NewPasswordRequired` when the provider issues that challenge.
    /// - `Authentication` for any other provider failure.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let provider = self.provider()?;
        match provider.authenticate(email, password).await {
            Ok(AuthOutcome::Authenticated(session)) => {
                self.store_tokens(&session, email);
                self.set_state(IdentityState::SignedIn);
                info!("event=auth_sign_in module=auth status=ok");
                Ok(session)
            }
            Ok(AuthOutcome::NewPasswordRequired) => {
                warn!("event=auth_sign_in module=auth status=error error_code=new_password_required");
                Err(AuthError::NewPasswordRequired)
            }
            Err(err) => {
                warn!(
                    "event=auth_sign_in module=auth status=error error_code={}",
                    err.code
                );
                Err(AuthError::Authentication(err))
            }
        }
    }

    /// Registers a new identity.
    pub async fn sign_up(&self, name: &str, email: &str, password: &str) -> Result<(), AuthError> {
        let provider = self.provider()?;
        provider
            .sign_up(name, email, password)
            .await
            .map_err(|err| {
                warn!(
                    "event=auth_sign_up module=auth status=error error_code={}",
                    err.code
                );
                AuthError::Registration(err)
            })?;
        info!("event=auth_sign_up module=auth status=ok");
        Ok(())
    }

    /// Clears stored tokens, then invalidates the cached identity
    /// provider-side (best-effort).
    ///
    /// Tokens are cleared before the provider call; a hung or dropped call
    /// leaves no stored tokens.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let provider = self.provider()?;
        let username = provider.current_user();
        self.clear_tokens();
        self.set_state(IdentityState::SignedOut);
        info!("event=auth_sign_out module=auth status=ok");

        if let Some(username) = username {
            if let Err(err) = provider.sign_out(username.as_str()).await {
                debug!(
                    "event=auth_sign_out module=auth status=skip reason=provider_error error_code={}",
                    err.code
                );
            }
        }
        Ok(())
    }

    /// Returns the current valid session, refreshing stored tokens.
    ///
    /// Resolves `None` without a network call when no identity is cached,
    /// and `None` when the provider's session is no longer valid.
    pub async fn get_current_session(&self) -> Result<Option<Session>, AuthError> {
        let provider = self.provider()?;
        let Some(username) = provider.current_user() else {
            self.set_state(IdentityState::SignedOut);
            return Ok(None);
        };

        let session = provider
            .get_session(username.as_str())
            .await
            .map_err(|err| {
                warn!(
                    "event=auth_session module=auth status=error error_code={}",
                    err.code
                );
                AuthError::Session(err)
            })?;

        match session {
            Some(session) if session.is_valid() => {
                if let Some(email) = self.get_stored_user_email() {
                    self.store_tokens(&session, email.as_str());
                }
                self.set_state(IdentityState::SignedIn);
                Ok(Some(session))
            }
            _ => {
                self.set_state(IdentityState::SignedOut);
                Ok(None)
            }
        }
    }

    /// `true` iff a valid session resolves; every failure reads as `false`.
    pub async fn is_authenticated(&self) -> bool {
        matches!(self.get_current_session().await, Ok(Some(session)) if session.is_valid())
    }

    /// Stored access token. Not validated.
    pub fn get_access_token(&self) -> Option<String> {
        self.storage.load(ACCESS_TOKEN_KEY, None)
    }

    /// Stored identity token. Not validated.
    pub fn get_id_token(&self) -> Option<String> {
        self.storage.load(ID_TOKEN_KEY, None)
    }

    pub fn get_stored_user_email(&self) -> Option<String> {
        self.storage.load(USER_EMAIL_KEY, None)
    }

    fn provider(&self) -> Result<&Arc<dyn IdentityProvider>, AuthError> {
        self.provider.as_ref().ok_or(AuthError::NotConfigured)
    }

    fn set_state(&self, next: IdentityState) {
        if let Ok(mut state) = self.state.lock() {
            *state = next;
        }
    }

    fn store_tokens(&self, session: &Session, email: &str) {
        self.storage.save(ACCESS_TOKEN_KEY, session.access_token.as_str());
        self.storage.save(ID_TOKEN_KEY, session.id_token.as_str());
        self.storage
            .save(REFRESH_TOKEN_KEY, session.refresh_token.as_str());
        self.storage.save(USER_EMAIL_KEY, email);
    }

    fn clear_tokens(&self) {
        for key in SESSION_KEYS {
            self.storage.remove(key);
        }
    }
}
