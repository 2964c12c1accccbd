//! Identity error taxonomy.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failure reported by the identity provider, passed through verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    /// Provider error code, e.g. `NotAuthorizedException`.
    pub code: String,
    /// Provider message, e.g. `Incorrect username or password.`.
    pub message: String,
}

impl ProviderError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Transport-level failure (DNS, TLS, connection reset, bad payload).
    pub fn network(message: impl Into<String>) -> Self {
        Self::new("NetworkError", message)
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl Error for ProviderError {}

/// Error returned by identity session operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Provider identifiers were missing when the service was built.
    NotConfigured,
    /// Sign-in rejected (bad credentials, unknown user, network failure).
    Authentication(ProviderError),
    /// Provider demands a password change; no continuation is offered.
    NewPasswordRequired,
    /// Sign-up rejected (duplicate account, weak password, ...).
    Registration(ProviderError),
    /// Session lookup or refresh failed.
    Session(ProviderError),
}

impl AuthError {
    /// Provider failure behind this error, if any.
    pub fn provider_error(&self) -> Option<&ProviderError> {
        match self {
            Self::Authentication(err) | Self::Registration(err) | Self::Session(err) => Some(err),
            Self::NotConfigured | Self::NewPasswordRequired => None,
        }
    }
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "identity provider is not configured"),
            Self::Authentication(err) => write!(f, "{}", err.message),
            Self::NewPasswordRequired => write!(f, "New password required"),
            Self::Registration(err) => write!(f, "{}", err.message),
            Self::Session(err) => write!(f, "session lookup failed: {}", err.message),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Authentication(err) | Self::Registration(err) | Self::Session(err) => Some(err),
            Self::NotConfigured | Self::NewPasswordRequired => None,
        }
    }
}
