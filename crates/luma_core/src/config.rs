//! Runtime configuration from environment variables.
//!
//! # Invariants
//! - Blank values are treated as unset.
//! - Missing identity identifiers do not fail configuration; they yield a
//!   degraded identity service instead.

use std::path::PathBuf;

pub const ENV_DATA_PATH: &str = "LUMA_DATA_PATH";
pub const ENV_LOG_LEVEL: &str = "LUMA_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "LUMA_LOG_DIR";
pub const ENV_USER_POOL_ID: &str = "LUMA_COGNITO_USER_POOL_ID";
pub const ENV_CLIENT_ID: &str = "LUMA_COGNITO_CLIENT_ID";
pub const ENV_REGION: &str = "LUMA_AWS_REGION";
pub const ENV_COGNITO_ENDPOINT: &str = "LUMA_COGNITO_ENDPOINT";

pub const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_DATA_FILE_NAME: &str = "luma.sqlite3";

/// Hosted identity provider settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityConfig {
    pub user_pool_id: String,
    pub client_id: String,
    pub region: String,
    /// Overrides the regional endpoint, e.g. for a local emulator.
    pub endpoint: Option<String>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            user_pool_id: String::new(),
            client_id: String::new(),
            region: DEFAULT_REGION.to_string(),
            endpoint: None,
        }
    }
}

impl IdentityConfig {
    /// Both pool and client identifiers are present.
    pub fn is_configured(&self) -> bool {
        !self.user_pool_id.trim().is_empty() && !self.client_id.trim().is_empty()
    }

    /// Identity provider API endpoint.
    pub fn endpoint(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| format!("https://cognito-idp.{}.amazonaws.com/", self.region))
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Durable store file. Defaults to `luma.sqlite3` in the temp dir.
    pub data_path: PathBuf,
    /// Log level; `None` uses the build-mode default.
    pub log_level: Option<String>,
    /// Absolute log directory; `None` disables file logging.
    pub log_dir: Option<PathBuf>,
    pub identity: IdentityConfig,
}

impl AppConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, which maps a variable name to
    /// its raw value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            data_path: read(ENV_DATA_PATH)
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DATA_FILE_NAME)),
            log_level: read(ENV_LOG_LEVEL),
            log_dir: read(ENV_LOG_DIR).map(PathBuf::from),
            identity: IdentityConfig {
                user_pool_id: read(ENV_USER_POOL_ID).unwrap_or_default(),
                client_id: read(ENV_CLIENT_ID).unwrap_or_default(),
                region: read(ENV_REGION).unwrap_or_else(|| DEFAULT_REGION.to_string()),
                endpoint: read(ENV_COGNITO_ENDPOINT),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_unconfigured_identity() {
        let config = AppConfig::from_lookup(|_| None);
        assert!(!config.identity.is_configured());
        assert_eq!(config.identity.region, DEFAULT_REGION);
        assert!(config.data_path.ends_with(DEFAULT_DATA_FILE_NAME));
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (ENV_USER_POOL_ID, "  "),
            (ENV_CLIENT_ID, "client"),
        ]));
        assert!(!config.identity.is_configured());
    }

    #[test]
    fn identity_endpoint_follows_region_unless_overridden() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (ENV_USER_POOL_ID, "eu-west-1_abc"),
            (ENV_CLIENT_ID, "client"),
            (ENV_REGION, "eu-west-1"),
        ]));
        assert!(config.identity.is_configured());
        assert_eq!(
            config.identity.endpoint(),
            "https://cognito-idp.eu-west-1.amazonaws.com/"
        );

        let local = AppConfig::from_lookup(lookup_from(&[(
            ENV_COGNITO_ENDPOINT,
            "http://localhost:9229/",
        )]));
        assert_eq!(local.identity.endpoint(), "http://localhost:9229/");
    }
}
