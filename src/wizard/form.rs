//! Form state and local validation.

use secrecy::{ExposeSecret, SecretString};

use crate::error::FormError;

const BOT_TOKEN_REQUIRED: FormError = FormError::Required {
    field: "bot_token",
    message: "Bot token is required",
};

const BOT_NAME_REQUIRED: FormError = FormError::Required {
    field: "bot_name",
    message: "Bot name is required",
};

/// User input collected across the first two steps.
///
/// The token stays in the form when the user goes back, so a resubmission
/// uses whatever was last entered.
#[derive(Debug, Clone, Default)]
pub struct BotTokenForm {
    bot_token: Option<SecretString>,
    pub bot_name: String,
    pub description: String,
}

/// Token ready to be sent for validation.
#[derive(Debug, Clone)]
pub struct ValidatedToken(pub SecretString);

/// Step 2 input ready to be sent for bot creation.
#[derive(Debug, Clone)]
pub struct ValidatedBotDetails {
    pub bot_name: String,
    pub description: Option<String>,
}

impl BotTokenForm {
    pub fn set_bot_token(&mut self, token: impl Into<String>) {
        let token = token.into();
        self.bot_token = Some(SecretString::from(token.trim().to_string()));
    }

    pub fn bot_token(&self) -> Option<&SecretString> {
        self.bot_token.as_ref()
    }

    /// Whether a non-blank token has been entered. Drives the enabled state
    /// of the validate action.
    pub fn has_bot_token(&self) -> bool {
        self.bot_token
            .as_ref()
            .is_some_and(|t| !t.expose_secret().is_empty())
    }

    /// Fill the display name with the provider's name unless the user
    /// already typed one.
    pub fn default_bot_name(&mut self, first_name: &str) {
        if self.bot_name.trim().is_empty() {
            self.bot_name = first_name.to_string();
        }
    }

    pub fn validate_token(&self) -> Result<ValidatedToken, FormError> {
        match &self.bot_token {
            Some(token) if !token.expose_secret().is_empty() => {
                Ok(ValidatedToken(token.clone()))
            }
            _ => Err(BOT_TOKEN_REQUIRED),
        }
    }

    pub fn validate_bot_details(&self) -> Result<ValidatedBotDetails, FormError> {
        let bot_name = self.bot_name.trim();
        if bot_name.is_empty() {
            return Err(BOT_NAME_REQUIRED);
        }
        let description = self.description.trim();
        Ok(ValidatedBotDetails {
            bot_name: bot_name.to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
        })
    }
}
