use async_trait::async_trait;
use luma_core::auth::{ACCESS_TOKEN_KEY, ID_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_EMAIL_KEY};
use luma_core::{
    check_access, AuthError, AuthOutcome, IdentityConfig, IdentityProvider, IdentityService,
    IdentityState, KeyValueBackend, MemoryBackend, PersistentStorage, ProviderError,
    RouteDecision, Session,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use time::{Duration, OffsetDateTime};

/// Scripted provider: returns queued outcomes and counts network calls.
#[derive(Default)]
struct FakeProvider {
    auth_result: Mutex<Option<Result<AuthOutcome, ProviderError>>>,
    sign_up_result: Mutex<Option<Result<(), ProviderError>>>,
    session_result: Mutex<Option<Result<Option<Session>, ProviderError>>>,
    cached_user: Mutex<Option<String>>,
    network_calls: AtomicUsize,
    sign_outs: AtomicUsize,
    hang_sign_out: AtomicBool,
}

impl FakeProvider {
    fn with_auth(result: Result<AuthOutcome, ProviderError>) -> Self {
        let provider = Self::default();
        *provider.auth_result.lock().unwrap() = Some(result);
        provider
    }

    fn set_session(&self, result: Result<Option<Session>, ProviderError>) {
        *self.session_result.lock().unwrap() = Some(result);
    }

    fn set_cached_user(&self, username: &str) {
        *self.cached_user.lock().unwrap() = Some(username.to_string());
    }

    fn calls(&self) -> usize {
        self.network_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for FakeProvider {
    async fn authenticate(
        &self,
        username: &str,
        _password: &str,
    ) -> Result<AuthOutcome, ProviderError> {
        self.network_calls.fetch_add(1, Ordering::SeqCst);
        let result = self
            .auth_result
            .lock()
            .unwrap()
            .clone()
            .expect("auth result scripted");
        if matches!(result, Ok(AuthOutcome::Authenticated(_))) {
            self.set_cached_user(username);
        }
        result
    }

    async fn sign_up(&self, _name: &str, _email: &str, _password: &str) -> Result<(), ProviderError> {
        self.network_calls.fetch_add(1, Ordering::SeqCst);
        self.sign_up_result.lock().unwrap().clone().unwrap_or(Ok(()))
    }

    fn current_user(&self) -> Option<String> {
        self.cached_user.lock().unwrap().clone()
    }

    async fn get_session(&self, _username: &str) -> Result<Option<Session>, ProviderError> {
        self.network_calls.fetch_add(1, Ordering::SeqCst);
        self.session_result
            .lock()
            .unwrap()
            .clone()
            .expect("session result scripted")
    }

    async fn sign_out(&self, _username: &str) -> Result<(), ProviderError> {
        self.network_calls.fetch_add(1, Ordering::SeqCst);
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
        *self.cached_user.lock().unwrap() = None;
        if self.hang_sign_out.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        Err(ProviderError::network("offline"))
    }
}

fn session(tag: &str, valid_for: Duration) -> Session {
    Session {
        access_token: format!("access-{tag}"),
        id_token: format!("id-{tag}"),
        refresh_token: format!("refresh-{tag}"),
        expires_at: OffsetDateTime::now_utc() + valid_for,
    }
}

fn service_with(provider: Arc<FakeProvider>) -> (IdentityService, Arc<MemoryBackend>) {
    let backend = Arc::new(MemoryBackend::new());
    let storage = PersistentStorage::from_shared(backend.clone());
    (IdentityService::new(provider, storage), backend)
}

#[tokio::test]
async fn sign_in_stores_tokens_and_email() {
    let provider = Arc::new(FakeProvider::with_auth(Ok(AuthOutcome::Authenticated(
        session("a", Duration::hours(1)),
    ))));
    let (service, backend) = service_with(provider);
    assert_eq!(service.identity_state(), IdentityState::Unknown);

    let signed_in = service.sign_in("ada@example.com", "hunter22").await.unwrap();
    assert_eq!(signed_in.access_token, "access-a");
    assert_eq!(service.get_access_token().as_deref(), Some("access-a"));
    assert_eq!(service.get_id_token().as_deref(), Some("id-a"));
    assert_eq!(
        service.get_stored_user_email().as_deref(),
        Some("ada@example.com")
    );
    assert_eq!(
        backend.get_item(REFRESH_TOKEN_KEY).unwrap().as_deref(),
        Some("\"refresh-a\"")
    );
    assert_eq!(service.identity_state(), IdentityState::SignedIn);
    assert_eq!(
        check_access(&PersistentStorage::from_shared(backend)),
        RouteDecision::Allow
    );
}

#[tokio::test]
async fn bad_credentials_reject_without_writing_tokens() {
    let provider = Arc::new(FakeProvider::with_auth(Err(ProviderError::new(
        "NotAuthorizedException",
        "Incorrect username or password.",
    ))));
    let (service, backend) = service_with(provider);

    let err = service.sign_in("bad@example.com", "wrong").await.unwrap_err();
    match &err {
        AuthError::Authentication(reason) => {
            assert_eq!(reason.code, "NotAuthorizedException");
            assert_eq!(reason.message, "Incorrect username or password.");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.to_string(), "Incorrect username or password.");
    assert!(backend.is_empty());
}

#[tokio::test]
async fn new_password_challenge_is_a_distinct_permanent_failure() {
    let provider = Arc::new(FakeProvider::with_auth(Ok(AuthOutcome::NewPasswordRequired)));
    let (service, backend) = service_with(provider);

    let err = service.sign_in("new@example.com", "temp").await.unwrap_err();
    assert_eq!(err, AuthError::NewPasswordRequired);
    assert!(backend.is_empty());
}

#[tokio::test]
async fn sign_up_passes_rejection_reason_through() {
    let provider = Arc::new(FakeProvider::default());
    *provider.sign_up_result.lock().unwrap() = Some(Err(ProviderError::new(
        "UsernameExistsException",
        "An account with the given email already exists.",
    )));
    let (service, _) = service_with(provider.clone());

    let err = service
        .sign_up("Ada", "ada@example.com", "hunter22")
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "An account with the given email already exists."
    );
    assert!(matches!(err, AuthError::Registration(_)));

    *provider.sign_up_result.lock().unwrap() = None;
    service
        .sign_up("Grace", "grace@example.com", "hunter22")
        .await
        .unwrap();
}

#[tokio::test]
async fn sign_out_clears_tokens_even_when_provider_fails() {
    let provider = Arc::new(FakeProvider::with_auth(Ok(AuthOutcome::Authenticated(
        session("a", Duration::hours(1)),
    ))));
    let (service, backend) = service_with(provider.clone());
    service.sign_in("ada@example.com", "hunter22").await.unwrap();

    service.sign_out().await.unwrap();

    assert_eq!(provider.sign_outs.load(Ordering::SeqCst), 1);
    for key in [ACCESS_TOKEN_KEY, ID_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_EMAIL_KEY] {
        assert_eq!(backend.get_item(key).unwrap(), None, "{key} should be cleared");
    }
    assert_eq!(service.identity_state(), IdentityState::SignedOut);
}

#[tokio::test]
async fn sign_out_clears_tokens_before_provider_call_resolves() {
    let provider = Arc::new(FakeProvider::with_auth(Ok(AuthOutcome::Authenticated(
        session("a", Duration::hours(1)),
    ))));
    provider.hang_sign_out.store(true, Ordering::SeqCst);
    let (service, backend) = service_with(provider.clone());
    service.sign_in("ada@example.com", "hunter22").await.unwrap();

    let outcome =
        tokio::time::timeout(std::time::Duration::from_millis(200), service.sign_out()).await;

    assert!(outcome.is_err(), "provider sign-out should still be pending");
    assert_eq!(provider.sign_outs.load(Ordering::SeqCst), 1);
    assert_eq!(service.get_access_token(), None);
    for key in [ACCESS_TOKEN_KEY, ID_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_EMAIL_KEY] {
        assert_eq!(backend.get_item(key).unwrap(), None, "{key} should be cleared");
    }
    assert_eq!(service.identity_state(), IdentityState::SignedOut);
    assert_eq!(
        check_access(&PersistentStorage::from_shared(backend)),
        RouteDecision::Redirect(luma_core::auth::guard::LOGIN_ROUTE)
    );
}

#[tokio::test]
async fn sign_out_without_cached_identity_skips_provider() {
    let provider = Arc::new(FakeProvider::default());
    let (service, _) = service_with(provider.clone());
    service.sign_out().await.unwrap();
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn no_cached_identity_resolves_none_without_network() {
    let provider = Arc::new(FakeProvider::default());
    let (service, _) = service_with(provider.clone());

    assert_eq!(service.get_current_session().await, Ok(None));
    assert!(!service.is_authenticated().await);
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn valid_session_refreshes_stored_tokens_with_stored_email() {
    let provider = Arc::new(FakeProvider::with_auth(Ok(AuthOutcome::Authenticated(
        session("a", Duration::hours(1)),
    ))));
    let (service, _) = service_with(provider.clone());
    service.sign_in("ada@example.com", "hunter22").await.unwrap();

    provider.set_session(Ok(Some(session("b", Duration::hours(1)))));
    let current = service.get_current_session().await.unwrap().unwrap();

    assert_eq!(current.access_token, "access-b");
    assert_eq!(service.get_access_token().as_deref(), Some("access-b"));
    assert_eq!(
        service.get_stored_user_email().as_deref(),
        Some("ada@example.com")
    );
    assert!(service.is_authenticated().await);
}

#[tokio::test]
async fn valid_session_without_stored_email_leaves_tokens_alone() {
    let provider = Arc::new(FakeProvider::default());
    provider.set_cached_user("ada@example.com");
    provider.set_session(Ok(Some(session("b", Duration::hours(1)))));
    let (service, backend) = service_with(provider);

    assert!(service.get_current_session().await.unwrap().is_some());
    assert!(backend.is_empty());
}

#[tokio::test]
async fn expired_session_resolves_none() {
    let provider = Arc::new(FakeProvider::default());
    provider.set_cached_user("ada@example.com");
    provider.set_session(Ok(Some(session("old", -Duration::minutes(5)))));
    let (service, _) = service_with(provider);

    assert_eq!(service.get_current_session().await, Ok(None));
    assert_eq!(service.identity_state(), IdentityState::SignedOut);
    assert!(!service.is_authenticated().await);
}

#[tokio::test]
async fn provider_session_error_rejects_but_is_authenticated_is_false() {
    let provider = Arc::new(FakeProvider::default());
    provider.set_cached_user("ada@example.com");
    provider.set_session(Err(ProviderError::network("connection reset")));
    let (service, _) = service_with(provider);

    let err = service.get_current_session().await.unwrap_err();
    assert!(matches!(err, AuthError::Session(_)));
    assert!(!service.is_authenticated().await);
}

#[tokio::test]
async fn stored_tokens_are_returned_without_validation() {
    let backend = Arc::new(MemoryBackend::new());
    let storage = PersistentStorage::from_shared(backend);
    storage.save(ACCESS_TOKEN_KEY, "stale-token");
    let service = IdentityService::new(Arc::new(FakeProvider::default()), storage);
    assert_eq!(service.get_access_token().as_deref(), Some("stale-token"));
}

#[tokio::test]
async fn unconfigured_service_fails_every_provider_call() {
    let storage = PersistentStorage::in_memory();
    storage.save(USER_EMAIL_KEY, "ada@example.com");
    let service = IdentityService::from_config(&IdentityConfig::default(), storage);

    assert!(!service.is_configured());
    assert_eq!(
        service.sign_in("ada@example.com", "pw").await.unwrap_err(),
        AuthError::NotConfigured
    );
    assert_eq!(
        service.sign_up("Ada", "ada@example.com", "pw").await,
        Err(AuthError::NotConfigured)
    );
    assert_eq!(service.sign_out().await, Err(AuthError::NotConfigured));
    assert_eq!(
        service.get_current_session().await,
        Err(AuthError::NotConfigured)
    );
    assert!(!service.is_authenticated().await);
    assert_eq!(
        service.get_stored_user_email().as_deref(),
        Some("ada@example.com")
    );
}
