//! Identity session adapter over a hosted identity provider.
//!
//! # Responsibility
//! - Expose sign-in, sign-up, sign-out and session lookup as async calls.
//! - Mirror the session tokens and user email into shared storage for
//!   synchronous reads.
//! - Keep provider wire types behind the [`IdentityProvider`] seam.
//!
//! # Invariants
//! - Token keys are written only after a successful authentication or a
//!   valid session lookup.
//! - A service built without provider configuration never touches the
//!   network and fails every provider-backed call with `NotConfigured`.
//! - Stored tokens are never validated on read; only session lookups
//!   validate.

mod cognito;
mod error;
pub mod guard;
mod provider;
mod service;

pub use cognito::CognitoProvider;
pub use error::{AuthError, ProviderError};
pub use provider::{AuthOutcome, IdentityProvider, Session};
pub use service::{IdentityService, IdentityState};

/// Storage key for the access token.
pub const ACCESS_TOKEN_KEY: &str = "luma_access_token";
/// Storage key for the identity token.
pub const ID_TOKEN_KEY: &str = "luma_id_token";
/// Storage key for the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "luma_refresh_token";
/// Storage key for the signed-in user's email.
pub const USER_EMAIL_KEY: &str = "luma_user_email";

/// All keys owned by the identity adapter.
pub const SESSION_KEYS: [&str; 4] = [
    ACCESS_TOKEN_KEY,
    ID_TOKEN_KEY,
    REFRESH_TOKEN_KEY,
    USER_EMAIL_KEY,
];
