//! Configuration types.

use std::time::Duration;

use crate::error::ConfigError;

/// Default API location when `SETUP_API_BASE_URL` is unset.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Default name of the variable holding the bearer access token.
pub const DEFAULT_ACCESS_TOKEN_VAR: &str = "SETUP_ACCESS_TOKEN";

/// Wizard configuration.
#[derive(Debug, Clone)]
pub struct SetupConfig {
    /// Base URL of the bot-provisioning API (no trailing slash).
    pub api_base_url: String,
    /// Public origin used to build webhook URLs.
    pub origin: String,
    /// Environment variable the credential provider reads at call time.
    pub access_token_var: String,
    /// Per-request HTTP timeout.
    pub http_timeout: Duration,
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            origin: DEFAULT_API_BASE_URL.to_string(),
            access_token_var: DEFAULT_ACCESS_TOKEN_VAR.to_string(),
            http_timeout: Duration::from_secs(30),
        }
    }
}

impl SetupConfig {
    /// Build configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_base_url = match lookup("SETUP_API_BASE_URL") {
            Some(url) => normalize_url("SETUP_API_BASE_URL", &url)?,
            None => defaults.api_base_url,
        };

        let origin = match lookup("SETUP_ORIGIN") {
            Some(url) => normalize_url("SETUP_ORIGIN", &url)?,
            None => api_base_url.clone(),
        };

        let access_token_var = lookup("SETUP_ACCESS_TOKEN_VAR")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.access_token_var);

        let http_timeout = match lookup("SETUP_HTTP_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    key: "SETUP_HTTP_TIMEOUT_SECS".to_string(),
                    message: format!("expected a whole number of seconds, got {raw:?}"),
                })?;
                if secs == 0 {
                    return Err(ConfigError::InvalidValue {
                        key: "SETUP_HTTP_TIMEOUT_SECS".to_string(),
                        message: "timeout must be greater than zero".to_string(),
                    });
                }
                Duration::from_secs(secs)
            }
            None => defaults.http_timeout,
        };

        Ok(Self {
            api_base_url,
            origin,
            access_token_var,
            http_timeout,
        })
    }
}

fn normalize_url(key: &str, raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected an http(s) URL, got {raw:?}"),
        });
    }
    Ok(trimmed.to_string())
}
