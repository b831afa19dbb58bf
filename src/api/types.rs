//! Wire types shared with the bot-provisioning API.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};

/// Platform identifier sent with every created bot.
pub const PLATFORM_TELEGRAM: &str = "telegram";

/// System prompt every new bot starts with.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant. Respond to user messages in a friendly and professional manner.";

/// Greeting sent when a user first talks to the bot.
pub const DEFAULT_WELCOME_MESSAGE: &str = "Hello! I'm your AI assistant. How can I help you today?";

/// Reply used when the bot cannot make sense of a message.
pub const DEFAULT_FALLBACK_MESSAGE: &str =
    "I'm sorry, I didn't understand that. Could you please rephrase your question?";

/// Metadata about the Telegram bot account, as reported by the server after
/// validating its token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotInfo {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    #[serde(default)]
    pub can_join_groups: bool,
    #[serde(default)]
    pub can_read_all_group_messages: bool,
    #[serde(default)]
    pub supports_inline_queries: bool,
    #[serde(default)]
    pub premium_chatbot_ready: bool,
    #[serde(default)]
    pub setup_instructions: SetupInstructions,
}

/// The four provider-side steps needed to finish setup.
///
/// Steps the server leaves out are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetupInstructions {
    pub step_1: String,
    pub step_2: String,
    pub step_3: String,
    pub step_4: String,
}

impl SetupInstructions {
    /// Instructions in order.
    pub fn steps(&self) -> [&str; 4] {
        [&self.step_1, &self.step_2, &self.step_3, &self.step_4]
    }
}

/// Body of `POST /api/v1/bots/validate-telegram-token`.
#[derive(Debug, Serialize)]
pub struct ValidateTokenRequest<'a> {
    #[serde(serialize_with = "expose")]
    pub bot_token: &'a SecretString,
}

/// Response of `POST /api/v1/bots/validate-telegram-token`.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidateTokenResponse {
    #[serde(default)]
    pub valid: bool,
    #[serde(default)]
    pub bot_info: Option<BotInfo>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of `POST /api/v1/bots`.
#[derive(Debug, Serialize)]
pub struct CreateBotRequest<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    pub platform: &'static str,
    #[serde(serialize_with = "expose")]
    pub telegram_bot_token: &'a SecretString,
    pub system_prompt: &'static str,
    pub welcome_message: &'static str,
    pub fallback_message: &'static str,
}

impl<'a> CreateBotRequest<'a> {
    /// A Telegram bot with the stock conversational configuration.
    pub fn telegram(
        name: &'a str,
        description: Option<&'a str>,
        telegram_bot_token: &'a SecretString,
    ) -> Self {
        Self {
            name,
            description,
            platform: PLATFORM_TELEGRAM,
            telegram_bot_token,
            system_prompt: DEFAULT_SYSTEM_PROMPT,
            welcome_message: DEFAULT_WELCOME_MESSAGE,
            fallback_message: DEFAULT_FALLBACK_MESSAGE,
        }
    }
}

/// The bot record created by the server.
///
/// Only the fields the wizard relies on are typed; anything else the server
/// returns is carried in `extra` so callers receive the full record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedBot {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_platform")]
    pub platform: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_platform() -> String {
    PLATFORM_TELEGRAM.to_string()
}

/// Body of `POST /api/v1/bots/{id}/setup-premium-chatbot`.
#[derive(Debug, Clone, Serialize)]
pub struct PremiumSetupRequest {
    pub webhook_url: String,
}

/// Error body returned with non-success statuses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    /// The detail, when it is a plain message.
    pub fn message(self) -> Option<String> {
        match self.detail? {
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
            _ => None,
        }
    }
}

fn expose<S: Serializer>(secret: &&SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}
