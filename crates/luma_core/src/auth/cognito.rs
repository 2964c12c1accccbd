//! Amazon Cognito user-pool client over the JSON HTTP API.
//!
//! # Responsibility
//! - Translate [`IdentityProvider`] calls into `InitiateAuth`, `SignUp` and
//!   `GlobalSignOut` requests.
//! - Cache the last authenticated user so session lookups can refresh
//!   tokens without a password.
//!
//! # Invariants
//! - Cognito request/response shapes never leave this module.
//! - The user cache lives under a client-scoped storage key disjoint from
//!   the application's token keys.
//! - No request timeout is configured.

use super::error::ProviderError;
use super::provider::{AuthOutcome, IdentityProvider, Session};
use crate::config::IdentityConfig;
use crate::model::now;
use crate::storage::PersistentStorage;
use async_trait::async_trait;
use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use time::Duration;

const TARGET_PREFIX: &str = "AWSCognitoIdentityProviderService";
const CONTENT_TYPE: &str = "application/x-amz-json-1.1";
const NEW_PASSWORD_CHALLENGE: &str = "NEW_PASSWORD_REQUIRED";

/// Cognito-backed identity provider.
pub struct CognitoProvider {
    client: reqwest::Client,
    endpoint: String,
    client_id: String,
    cache: PersistentStorage,
    cache_key: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CachedUser {
    username: String,
    session: Session,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthRequest<'a> {
    auth_flow: &'a str,
    client_id: &'a str,
    auth_parameters: HashMap<&'a str, &'a str>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthResponse {
    #[serde(default)]
    authentication_result: Option<AuthenticationResult>,
    #[serde(default)]
    challenge_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticationResult {
    access_token: String,
    id_token: String,
    /// Absent on refresh responses.
    #[serde(default)]
    refresh_token: Option<String>,
    /// Seconds until the access token expires.
    expires_in: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SignUpRequest<'a> {
    client_id: &'a str,
    username: &'a str,
    password: &'a str,
    user_attributes: Vec<AttributeType<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct AttributeType<'a> {
    name: &'a str,
    value: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct GlobalSignOutRequest<'a> {
    access_token: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(rename = "__type", default)]
    kind: Option<String>,
    #[serde(alias = "Message", default)]
    message: Option<String>,
}

impl CognitoProvider {
    /// Builds a provider for `config`, caching the signed-in user in `cache`.
    pub fn new(config: &IdentityConfig, cache: PersistentStorage) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|err| ProviderError::network(err.to_string()))?;
        Ok(Self {
            client,
            endpoint: config.endpoint(),
            client_id: config.client_id.clone(),
            cache,
            cache_key: cache_key(config.client_id.as_str()),
        })
    }

    async fn call<B, R>(&self, action: &str, body: &B) -> Result<R, ProviderError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let payload =
            serde_json::to_string(body).map_err(|err| ProviderError::network(err.to_string()))?;
        let response = self
            .client
            .post(self.endpoint.as_str())
            .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE)
            .header("X-Amz-Target", format!("{TARGET_PREFIX}.{action}"))
            .body(payload)
            .send()
            .await
            .map_err(|err| ProviderError::network(err.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| ProviderError::network(err.to_string()))?;
        debug!(
            "event=cognito_call module=auth action={action} http_status={}",
            status.as_u16()
        );

        if status.is_success() {
            serde_json::from_str(text.as_str())
                .map_err(|err| ProviderError::network(format!("malformed {action} response: {err}")))
        } else {
            Err(parse_error_body(text.as_str(), status.as_u16()))
        }
    }

    async fn initiate_auth(
        &self,
        flow: &str,
        parameters: HashMap<&str, &str>,
    ) -> Result<InitiateAuthResponse, ProviderError> {
        let request = InitiateAuthRequest {
            auth_flow: flow,
            client_id: self.client_id.as_str(),
            auth_parameters: parameters,
        };
        self.call("InitiateAuth", &request).await
    }

    fn cached_user(&self) -> Option<CachedUser> {
        self.cache.load(self.cache_key.as_str(), None)
    }

    fn cache_user(&self, username: &str, session: &Session) {
        let cached = CachedUser {
            username: username.to_string(),
            session: session.clone(),
        };
        self.cache.save(self.cache_key.as_str(), &cached);
    }

    async fn refresh(&self, cached: &CachedUser) -> Result<Session, ProviderError> {
        let parameters = HashMap::from([("REFRESH_TOKEN", cached.session.refresh_token.as_str())]);
        let response = self
            .initiate_auth("REFRESH_TOKEN_AUTH", parameters)
            .await?;
        let result = response.authentication_result.ok_or_else(|| {
            ProviderError::new("InvalidResponse", "refresh returned no authentication result")
        })?;
        Ok(session_from_result(
            result,
            Some(cached.session.refresh_token.as_str()),
        ))
    }
}

#[async_trait]
impl IdentityProvider for CognitoProvider {
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthOutcome, ProviderError> {
        let parameters = HashMap::from([("USERNAME", username), ("PASSWORD", password)]);
        let response = self
            .initiate_auth("USER_PASSWORD_AUTH", parameters)
            .await?;
        let outcome = auth_outcome(response)?;
        if let AuthOutcome::Authenticated(session) = &outcome {
            self.cache_user(username, session);
        }
        Ok(outcome)
    }

    async fn sign_up(&self, name: &str, email: &str, password: &str) -> Result<(), ProviderError> {
        let request = SignUpRequest {
            client_id: self.client_id.as_str(),
            username: email,
            password,
            user_attributes: vec![
                AttributeType {
                    name: "email",
                    value: email,
                },
                AttributeType {
                    name: "name",
                    value: name,
                },
            ],
        };
        let _: serde_json::Value = self.call("SignUp", &request).await?;
        Ok(())
    }

    fn current_user(&self) -> Option<String> {
        self.cached_user().map(|cached| cached.username)
    }

    async fn get_session(&self, username: &str) -> Result<Option<Session>, ProviderError> {
        let Some(cached) = self.cached_user().filter(|cached| cached.username == username) else {
            return Ok(None);
        };
        if cached.session.is_valid() {
            return Ok(Some(cached.session));
        }

        let refreshed = self.refresh(&cached).await?;
        self.cache_user(username, &refreshed);
        Ok(Some(refreshed))
    }

    async fn sign_out(&self, username: &str) -> Result<(), ProviderError> {
        let cached = self
            .cached_user()
            .filter(|cached| cached.username == username);
        self.cache.remove(self.cache_key.as_str());

        if let Some(cached) = cached {
            let request = GlobalSignOutRequest {
                access_token: cached.session.access_token.as_str(),
            };
            let _: serde_json::Value = self.call("GlobalSignOut", &request).await?;
        }
        Ok(())
    }
}

fn cache_key(client_id: &str) -> String {
    format!("luma_cognito:{client_id}:user")
}

fn auth_outcome(response: InitiateAuthResponse) -> Result<AuthOutcome, ProviderError> {
    if let Some(result) = response.authentication_result {
        return Ok(AuthOutcome::Authenticated(session_from_result(result, None)));
    }
    match response.challenge_name.as_deref() {
        Some(NEW_PASSWORD_CHALLENGE) => Ok(AuthOutcome::NewPasswordRequired),
        Some(other) => Err(ProviderError::new(
            "UnsupportedChallenge",
            format!("unsupported authentication challenge: {other}"),
        )),
        None => Err(ProviderError::new(
            "InvalidResponse",
            "authentication returned neither tokens nor a challenge",
        )),
    }
}

fn session_from_result(result: AuthenticationResult, fallback_refresh: Option<&str>) -> Session {
    let refresh_token = result
        .refresh_token
        .or_else(|| fallback_refresh.map(str::to_string))
        .unwrap_or_default();
    Session {
        access_token: result.access_token,
        id_token: result.id_token,
        refresh_token,
        expires_at: now() + Duration::seconds(result.expires_in),
    }
}

fn parse_error_body(body: &str, http_status: u16) -> ProviderError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let code = parsed
        .kind
        .as_deref()
        .map(|kind| kind.rsplit('#').next().unwrap_or(kind).to_string())
        .unwrap_or_else(|| format!("Http{http_status}"));
    let message = parsed
        .message
        .unwrap_or_else(|| format!("identity provider returned HTTP {http_status}"));
    ProviderError::new(code, message)
}
