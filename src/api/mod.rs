//! Bot-provisioning API: wire types and the HTTP client.

pub mod client;
pub mod types;

pub use client::{BotApi, HttpBotApi, premium_setup_path};
pub use types::{
    BotInfo, CreateBotRequest, CreatedBot, PremiumSetupRequest, SetupInstructions,
    DEFAULT_FALLBACK_MESSAGE, DEFAULT_SYSTEM_PROMPT, DEFAULT_WELCOME_MESSAGE,
};
