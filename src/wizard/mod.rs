//! The four-step Telegram bot setup wizard.
//!
//! Step 1 validates the bot token, step 2 creates the bot record, step 3
//! registers the Premium Chatbot webhook and step 4 confirms completion.
//! All durable work happens server-side; the wizard only holds transient
//! session state.

pub mod controller;
pub mod form;
pub mod render;
pub mod state;

pub use controller::{BotCreatedCallback, SetupWizard, WizardState, webhook_url};
pub use form::BotTokenForm;
pub use render::render;
pub use state::{WizardEvent, WizardStep};
