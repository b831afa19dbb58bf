//! HTTP client for the bot-provisioning API.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::types::{
    BotInfo, CreateBotRequest, CreatedBot, ErrorBody, PremiumSetupRequest, ValidateTokenRequest,
    ValidateTokenResponse,
};
use crate::config::SetupConfig;
use crate::credentials::CredentialProvider;
use crate::error::{ApiError, ConfigError};

pub const VALIDATE_TOKEN_PATH: &str = "/api/v1/bots/validate-telegram-token";
pub const BOTS_PATH: &str = "/api/v1/bots";

/// Path of the premium chatbot setup endpoint for a bot.
pub fn premium_setup_path(bot_id: i64) -> String {
    format!("/api/v1/bots/{bot_id}/setup-premium-chatbot")
}

/// The three remote operations the wizard depends on.
#[async_trait]
pub trait BotApi: Send + Sync {
    /// Ask the server to verify a Telegram bot token.
    ///
    /// Returns the bot's metadata when the token is valid. An invalid token
    /// is reported as [`ApiError::Rejected`] carrying the server's reason.
    async fn validate_token(&self, bot_token: &SecretString) -> Result<BotInfo, ApiError>;

    /// Create the bot record.
    async fn create_bot(&self, request: &CreateBotRequest<'_>) -> Result<CreatedBot, ApiError>;

    /// Register the premium chatbot webhook for a bot.
    async fn setup_premium_chatbot(
        &self,
        bot_id: i64,
        request: &PremiumSetupRequest,
    ) -> Result<serde_json::Value, ApiError>;
}

/// [`BotApi`] over HTTP with bearer authentication.
pub struct HttpBotApi {
    client: reqwest::Client,
    base_url: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl HttpBotApi {
    pub fn new(
        base_url: impl Into<String>,
        credentials: Arc<dyn CredentialProvider>,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub fn from_config(
        config: &SetupConfig,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self, ConfigError> {
        Self::new(&config.api_base_url, credentials, config.http_timeout)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// POST a JSON body with the current bearer token attached.
    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, ApiError> {
        let mut request = self.client.post(self.url(path)).json(body);
        match self.credentials.access_token() {
            Some(token) => request = request.bearer_auth(token.expose_secret()),
            None => tracing::warn!(
                endpoint = path,
                "No access token available; sending request unauthenticated"
            ),
        }

        tracing::debug!(endpoint = path, "Sending request");
        request.send().await.map_err(|e| ApiError::Transport {
            endpoint: path.to_string(),
            reason: e.to_string(),
        })
    }

    async fn read_json<T: DeserializeOwned>(
        path: &str,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        response.json::<T>().await.map_err(|e| ApiError::InvalidResponse {
            endpoint: path.to_string(),
            reason: e.to_string(),
        })
    }

    /// Decode a 2xx body, or turn anything else into a rejection carrying the
    /// server's `detail`.
    async fn expect_success<T: DeserializeOwned>(
        path: &str,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Self::read_json(path, response).await;
        }

        let body: ErrorBody = Self::read_json(path, response).await?;
        let detail = body.message();
        tracing::warn!(
            endpoint = path,
            status = status.as_u16(),
            detail = ?detail,
            "Request rejected"
        );
        Err(ApiError::Rejected {
            endpoint: path.to_string(),
            status: status.as_u16(),
            detail,
        })
    }
}

#[async_trait]
impl BotApi for HttpBotApi {
    async fn validate_token(&self, bot_token: &SecretString) -> Result<BotInfo, ApiError> {
        let path = VALIDATE_TOKEN_PATH;
        let response = self.post(path, &ValidateTokenRequest { bot_token }).await?;
        let status = response.status();

        // The verdict lives in the body whatever the status code says.
        let result: ValidateTokenResponse = Self::read_json(path, response).await?;
        if !result.valid {
            tracing::warn!(endpoint = path, status = status.as_u16(), "Bot token rejected");
            return Err(ApiError::Rejected {
                endpoint: path.to_string(),
                status: status.as_u16(),
                detail: result.error.filter(|e| !e.trim().is_empty()),
            });
        }

        let info = result.bot_info.ok_or_else(|| ApiError::InvalidResponse {
            endpoint: path.to_string(),
            reason: "token reported valid but bot_info is missing".to_string(),
        })?;
        tracing::info!(bot_id = info.id, username = %info.username, "Bot token validated");
        Ok(info)
    }

    async fn create_bot(&self, request: &CreateBotRequest<'_>) -> Result<CreatedBot, ApiError> {
        let response = self.post(BOTS_PATH, request).await?;
        let bot: CreatedBot = Self::expect_success(BOTS_PATH, response).await?;
        tracing::info!(bot_id = bot.id, name = %bot.name, "Bot created");
        Ok(bot)
    }

    async fn setup_premium_chatbot(
        &self,
        bot_id: i64,
        request: &PremiumSetupRequest,
    ) -> Result<serde_json::Value, ApiError> {
        let path = premium_setup_path(bot_id);
        let response = self.post(&path, request).await?;
        let result = Self::expect_success(&path, response).await?;
        tracing::info!(bot_id, webhook_url = %request.webhook_url, "Premium chatbot configured");
        Ok(result)
    }
}
