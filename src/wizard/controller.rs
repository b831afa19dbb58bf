//! SetupWizard: drives the four setup steps against the remote API.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::api::{BotApi, BotInfo, CreateBotRequest, CreatedBot, PremiumSetupRequest};
use crate::error::{ApiError, Result, WizardError};
use crate::notify::{Notification, NotificationSink};

use super::form::{BotTokenForm, ValidatedToken};
use super::state::{WizardEvent, WizardStep};

/// Called once with the new bot record after step 2 succeeds.
pub type BotCreatedCallback = Arc<dyn Fn(&CreatedBot) + Send + Sync>;

/// Webhook endpoint Telegram should deliver updates for `bot_id` to.
pub fn webhook_url(origin: &str, bot_id: i64) -> String {
    format!(
        "{}/api/v1/webhooks/telegram/{bot_id}",
        origin.trim_end_matches('/')
    )
}

/// Transient session state. Nothing here outlives the wizard.
#[derive(Debug, Clone, Default)]
pub struct WizardState {
    pub step: WizardStep,
    pub form: BotTokenForm,
    pub is_validating: bool,
    pub is_creating: bool,
    pub is_configuring: bool,
}

/// Remote operations, with the messages shown when they succeed or fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    ValidateToken,
    CreateBot,
    SetupPremiumChatbot,
}

impl Operation {
    fn label(self) -> &'static str {
        match self {
            Self::ValidateToken => "Token validation",
            Self::CreateBot => "Bot creation",
            Self::SetupPremiumChatbot => "Premium chatbot setup",
        }
    }

    fn success_message(self) -> &'static str {
        match self {
            Self::ValidateToken => "Bot token validated successfully!",
            Self::CreateBot => "Bot created successfully!",
            Self::SetupPremiumChatbot => "Premium Chatbot setup completed!",
        }
    }

    fn failure_message(self, err: &ApiError) -> String {
        if let Some(detail) = err.detail() {
            return detail.to_string();
        }
        let fallback = match (self, err.is_rejection()) {
            (Self::ValidateToken, true) => "Invalid bot token",
            (Self::ValidateToken, false) => "Failed to validate bot token",
            (Self::CreateBot, _) => "Failed to create bot",
            (Self::SetupPremiumChatbot, _) => "Failed to setup Premium Chatbot",
        };
        fallback.to_string()
    }

    /// The busy flag this operation holds while in flight.
    fn flag(self, state: &mut WizardState) -> &mut bool {
        match self {
            Self::ValidateToken => &mut state.is_validating,
            Self::CreateBot => &mut state.is_creating,
            Self::SetupPremiumChatbot => &mut state.is_configuring,
        }
    }
}

/// Clears an operation's busy flag if its future is dropped mid-request.
///
/// Completed operations clear the flag themselves under the state lock and
/// then [`disarm`](Self::disarm) the guard.
struct InFlight {
    state: Arc<RwLock<WizardState>>,
    op: Operation,
    armed: bool,
}

impl InFlight {
    fn new(state: &Arc<RwLock<WizardState>>, op: Operation) -> Self {
        Self {
            state: Arc::clone(state),
            op,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        tracing::debug!(operation = self.op.label(), "Wizard request abandoned");
        if let Ok(mut state) = self.state.try_write() {
            *self.op.flag(&mut state) = false;
            return;
        }
        // Lock is busy; clear once it frees up.
        let state = Arc::clone(&self.state);
        let op = self.op;
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                let mut state = state.write().await;
                *op.flag(&mut state) = false;
            });
        }
    }
}

/// Coordinates the wizard: form input, remote calls, step transitions and
/// notifications.
///
/// Methods take `&self`; state lives behind a lock that is never held
/// across a network call. A second submission while one is in flight is
/// refused with [`WizardError::Busy`]. Dropping a pending call releases
/// its busy flag, so the step can be retried.
pub struct SetupWizard {
    api: Arc<dyn BotApi>,
    notifier: Arc<dyn NotificationSink>,
    origin: String,
    on_bot_created: Option<BotCreatedCallback>,
    state: Arc<RwLock<WizardState>>,
}

impl SetupWizard {
    pub fn new(
        api: Arc<dyn BotApi>,
        notifier: Arc<dyn NotificationSink>,
        origin: impl Into<String>,
    ) -> Self {
        Self {
            api,
            notifier,
            origin: origin.into(),
            on_bot_created: None,
            state: Arc::new(RwLock::new(WizardState::default())),
        }
    }

    /// Register the callback fired when the bot record is created.
    pub fn on_bot_created<F>(mut self, callback: F) -> Self
    where
        F: Fn(&CreatedBot) + Send + Sync + 'static,
    {
        self.on_bot_created = Some(Arc::new(callback));
        self
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// A copy of the current state, for rendering.
    pub async fn snapshot(&self) -> WizardState {
        self.state.read().await.clone()
    }

    pub async fn step(&self) -> WizardStep {
        self.state.read().await.step.clone()
    }

    /// Edit form fields in place.
    pub async fn edit_form<F>(&self, edit: F)
    where
        F: FnOnce(&mut BotTokenForm),
    {
        let mut state = self.state.write().await;
        edit(&mut state.form);
    }

    /// Step 1: validate the entered token with the server.
    ///
    /// On success the bot info is stored, the display name is pre-filled
    /// and the wizard moves to step 2.
    pub async fn submit_token(&self) -> Result<BotInfo> {
        let op = Operation::ValidateToken;
        let token = {
            let mut state = self.state.write().await;
            ensure_step(&state.step, 1, "token_submitted")?;
            if state.is_validating {
                return Err(WizardError::Busy {
                    operation: op.label(),
                }
                .into());
            }
            let ValidatedToken(token) = state.form.validate_token()?;
            state.is_validating = true;
            token
        };
        let in_flight = InFlight::new(&self.state, op);

        let result = self.api.validate_token(&token).await;

        let mut state = self.state.write().await;
        state.is_validating = false;
        in_flight.disarm();
        let info = self.settle(op, result)?;

        state.step = state
            .step
            .transition(WizardEvent::TokenSubmitted(info.clone()))?;
        state.form.default_bot_name(&info.first_name);
        drop(state);

        tracing::info!(bot_id = info.id, "Wizard advanced to bot configuration");
        self.notifier
            .notify(Notification::success(op.success_message()));
        Ok(info)
    }

    /// Step 2: create the bot record with the stock conversational setup.
    pub async fn create_bot(&self) -> Result<CreatedBot> {
        let op = Operation::CreateBot;
        let (token, details) = {
            let mut state = self.state.write().await;
            ensure_step(&state.step, 2, "bot_created")?;
            if state.is_creating {
                return Err(WizardError::Busy {
                    operation: op.label(),
                }
                .into());
            }
            let details = state.form.validate_bot_details()?;
            let token = state
                .form
                .bot_token()
                .cloned()
                .ok_or(WizardError::MissingToken)?;
            state.is_creating = true;
            (token, details)
        };
        let in_flight = InFlight::new(&self.state, op);

        let request = CreateBotRequest::telegram(
            &details.bot_name,
            details.description.as_deref(),
            &token,
        );
        let result = self.api.create_bot(&request).await;

        let mut state = self.state.write().await;
        state.is_creating = false;
        in_flight.disarm();
        let bot = self.settle(op, result)?;

        state.step = state
            .step
            .transition(WizardEvent::BotCreated(bot.clone()))?;
        drop(state);

        if let Some(callback) = &self.on_bot_created {
            callback(&bot);
        }
        tracing::info!(bot_id = bot.id, "Wizard advanced to premium chatbot setup");
        self.notifier
            .notify(Notification::success(op.success_message()));
        Ok(bot)
    }

    /// Step 3: register the premium chatbot webhook. Triggered by the user.
    pub async fn setup_premium_chatbot(&self) -> Result<String> {
        let op = Operation::SetupPremiumChatbot;
        let bot_id = {
            let mut state = self.state.write().await;
            ensure_step(&state.step, 3, "webhook_configured")?;
            if state.is_configuring {
                return Err(WizardError::Busy {
                    operation: op.label(),
                }
                .into());
            }
            let bot_id = state
                .step
                .bot_info()
                .map(|info| info.id)
                .ok_or(WizardError::InvalidTransition {
                    step: state.step.number(),
                    event: "webhook_configured".to_string(),
                })?;
            state.is_configuring = true;
            bot_id
        };
        let in_flight = InFlight::new(&self.state, op);

        let request = PremiumSetupRequest {
            webhook_url: webhook_url(&self.origin, bot_id),
        };
        let result = self.api.setup_premium_chatbot(bot_id, &request).await;

        let mut state = self.state.write().await;
        state.is_configuring = false;
        in_flight.disarm();
        self.settle(op, result)?;

        state.step = state.step.transition(WizardEvent::WebhookConfigured)?;
        drop(state);

        tracing::info!(bot_id, "Wizard complete");
        self.notifier
            .notify(Notification::success(op.success_message()));
        Ok(request.webhook_url)
    }

    /// Return from step 2 to step 1. The entered token is kept.
    pub async fn back(&self) -> Result<()> {
        let mut state = self.state.write().await;
        if state.is_creating {
            return Err(WizardError::Busy {
                operation: Operation::CreateBot.label(),
            }
            .into());
        }
        state.step = state.step.transition(WizardEvent::Back)?;
        Ok(())
    }

    /// Leave the completed wizard, discarding all session state.
    pub async fn reset(&self) -> Result<()> {
        let mut state = self.state.write().await;
        let next = state.step.transition(WizardEvent::Reset)?;
        *state = WizardState {
            step: next,
            ..WizardState::default()
        };
        Ok(())
    }

    /// Turn an API outcome into a value, notifying the user on failure.
    fn settle<T>(&self, op: Operation, result: std::result::Result<T, ApiError>) -> Result<T> {
        result.map_err(|err| {
            tracing::warn!(operation = op.label(), error = %err, "Wizard step failed");
            self.notifier
                .notify(Notification::error(op.failure_message(&err)));
            err.into()
        })
    }
}

fn ensure_step(
    step: &WizardStep,
    expected: u8,
    event: &str,
) -> std::result::Result<(), WizardError> {
    if step.number() == expected {
        Ok(())
    } else {
        Err(WizardError::InvalidTransition {
            step: step.number(),
            event: event.to_string(),
        })
    }
}
