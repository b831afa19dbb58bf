//! Bearer credential providers.
//!
//! The access token is looked up on every request rather than captured at
//! construction, so a session refreshed elsewhere is picked up by the next
//! call.

use secrecy::SecretString;

/// Supplies the bearer token attached to every API request.
pub trait CredentialProvider: Send + Sync {
    /// Current access token, or `None` when no session is available.
    fn access_token(&self) -> Option<SecretString>;
}

/// A fixed token, for embedding and tests.
pub struct StaticCredentials {
    token: SecretString,
}

impl StaticCredentials {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: SecretString::from(token.into()),
        }
    }
}

impl CredentialProvider for StaticCredentials {
    fn access_token(&self) -> Option<SecretString> {
        Some(self.token.clone())
    }
}

/// Reads the token from an environment variable at call time.
pub struct EnvCredentials {
    var: String,
}

impl EnvCredentials {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    pub fn var(&self) -> &str {
        &self.var
    }
}

impl CredentialProvider for EnvCredentials {
    fn access_token(&self) -> Option<SecretString> {
        std::env::var(&self.var)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(SecretString::from)
    }
}
