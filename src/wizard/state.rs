//! Wizard state machine. Tracks which step the user is in.

use serde::{Deserialize, Serialize};

use crate::api::{BotInfo, CreatedBot};
use crate::error::WizardError;

/// The steps of the setup wizard.
///
/// Progresses linearly: ValidateToken → ConfigureBot → PremiumSetup →
/// Complete. The only way back is `Back` from ConfigureBot. Each step
/// carries exactly the data that exists once it has been reached, so a
/// step past the first can never lack its bot info.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum WizardStep {
    ValidateToken,
    ConfigureBot {
        bot_info: BotInfo,
    },
    PremiumSetup {
        bot_info: BotInfo,
        bot: CreatedBot,
    },
    Complete {
        bot_info: BotInfo,
        bot: CreatedBot,
    },
}

/// Named transitions between steps.
#[derive(Debug, Clone, PartialEq)]
pub enum WizardEvent {
    /// The token was validated by the server.
    TokenSubmitted(BotInfo),
    /// The bot record was created.
    BotCreated(CreatedBot),
    /// The premium chatbot webhook was registered.
    WebhookConfigured,
    /// The user went back from bot configuration to token entry.
    Back,
    /// The user left the completed wizard; everything starts over.
    Reset,
}

impl WizardEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::TokenSubmitted(_) => "token_submitted",
            Self::BotCreated(_) => "bot_created",
            Self::WebhookConfigured => "webhook_configured",
            Self::Back => "back",
            Self::Reset => "reset",
        }
    }
}

impl std::fmt::Display for WizardEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Default for WizardStep {
    fn default() -> Self {
        Self::ValidateToken
    }
}

impl WizardStep {
    /// 1-based position shown in the progress indicator.
    pub fn number(&self) -> u8 {
        match self {
            Self::ValidateToken => 1,
            Self::ConfigureBot { .. } => 2,
            Self::PremiumSetup { .. } => 3,
            Self::Complete { .. } => 4,
        }
    }

    /// Bot info, available from step 2 onward.
    pub fn bot_info(&self) -> Option<&BotInfo> {
        match self {
            Self::ValidateToken => None,
            Self::ConfigureBot { bot_info }
            | Self::PremiumSetup { bot_info, .. }
            | Self::Complete { bot_info, .. } => Some(bot_info),
        }
    }

    /// The created bot record, available from step 3 onward.
    pub fn created_bot(&self) -> Option<&CreatedBot> {
        match self {
            Self::PremiumSetup { bot, .. } | Self::Complete { bot, .. } => Some(bot),
            _ => None,
        }
    }

    /// Whether this step is terminal (setup is done).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete { .. })
    }

    /// Apply an event, returning the next step.
    ///
    /// Illegal events leave `self` untouched and return
    /// [`WizardError::InvalidTransition`].
    pub fn transition(&self, event: WizardEvent) -> Result<WizardStep, WizardError> {
        let next = match (self, event) {
            (Self::ValidateToken, WizardEvent::TokenSubmitted(bot_info)) => {
                Self::ConfigureBot { bot_info }
            }
            (Self::ConfigureBot { bot_info }, WizardEvent::BotCreated(bot)) => Self::PremiumSetup {
                bot_info: bot_info.clone(),
                bot,
            },
            (Self::ConfigureBot { .. }, WizardEvent::Back) => Self::ValidateToken,
            (Self::PremiumSetup { bot_info, bot }, WizardEvent::WebhookConfigured) => {
                Self::Complete {
                    bot_info: bot_info.clone(),
                    bot: bot.clone(),
                }
            }
            (Self::Complete { .. }, WizardEvent::Reset) => Self::ValidateToken,
            (_, event) => {
                return Err(WizardError::InvalidTransition {
                    step: self.number(),
                    event: event.to_string(),
                });
            }
        };
        Ok(next)
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::ValidateToken => "validate_token",
            Self::ConfigureBot { .. } => "configure_bot",
            Self::PremiumSetup { .. } => "premium_setup",
            Self::Complete { .. } => "complete",
        };
        write!(f, "{s}")
    }
}
