//! Interactive terminal driver. Reads answers line by line and renders
//! each step.

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::api::CreatedBot;
use crate::error::{Error, Result};
use crate::wizard::{SetupWizard, WizardStep, render};

/// Answer that empties an optional field instead of keeping it.
const CLEAR: &str = "-";

/// Run the wizard until it completes, the user quits, or input ends.
///
/// Returns the created bot record if step 2 succeeded.
pub async fn run<R, W>(
    wizard: &SetupWizard,
    input: R,
    out: &mut W,
) -> Result<Option<CreatedBot>>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let mut created = None;

    loop {
        let state = wizard.snapshot().await;
        writeln!(out, "{}", render(&state))?;

        match &state.step {
            WizardStep::ValidateToken => {
                let hint = if state.form.has_bot_token() {
                    "Bot token (Enter to reuse the last one, q to quit): "
                } else {
                    "Bot token (q to quit): "
                };
                let Some(line) = prompt(out, &mut lines, hint).await? else {
                    break;
                };
                if line == "q" {
                    break;
                }
                if !line.is_empty() {
                    wizard.edit_form(|f| f.set_bot_token(line)).await;
                }
                report(out, wizard.submit_token().await.map(|_| ()))?;
            }
            WizardStep::ConfigureBot { .. } => {
                let name_hint = format!("Bot display name [{}]: ", state.form.bot_name);
                let Some(name) = prompt(out, &mut lines, &name_hint).await? else {
                    break;
                };
                let description_hint = if state.form.description.is_empty() {
                    "Description (optional): ".to_string()
                } else {
                    format!(
                        "Description (optional) [{}], '-' to clear: ",
                        state.form.description
                    )
                };
                let Some(description) = prompt(out, &mut lines, &description_hint).await?
                else {
                    break;
                };
                wizard
                    .edit_form(|f| {
                        if !name.is_empty() {
                            f.bot_name = name;
                        }
                        match description.as_str() {
                            "" => {}
                            CLEAR => f.description.clear(),
                            _ => f.description = description,
                        }
                    })
                    .await;

                let Some(action) = prompt(
                    out,
                    &mut lines,
                    "Enter to create the bot, 'back' to change the token, q to quit: ",
                )
                .await?
                else {
                    break;
                };
                match action.as_str() {
                    "q" => break,
                    "back" => report(out, wizard.back().await)?,
                    _ => match wizard.create_bot().await {
                        Ok(bot) => created = Some(bot),
                        Err(e) => report(out, Err(e))?,
                    },
                }
            }
            WizardStep::PremiumSetup { .. } => {
                let Some(action) = prompt(
                    out,
                    &mut lines,
                    "Enter to set up the Premium Chatbot, q to quit: ",
                )
                .await?
                else {
                    break;
                };
                if action == "q" {
                    break;
                }
                report(out, wizard.setup_premium_chatbot().await.map(|_| ()))?;
            }
            WizardStep::Complete { .. } => {
                let _ = prompt(out, &mut lines, "Enter to go to the bot dashboard: ").await?;
                writeln!(out, "Dashboard: {}", wizard.origin())?;
                wizard.reset().await?;
                break;
            }
        }
    }

    Ok(created)
}

async fn prompt<R, W>(
    out: &mut W,
    lines: &mut tokio::io::Lines<R>,
    hint: &str,
) -> Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    write!(out, "{hint}")?;
    out.flush()?;
    Ok(lines.next_line().await?.map(|l| l.trim().to_string()))
}

/// Print local problems inline. Remote failures were already surfaced by the
/// notification sink.
fn report<W: Write>(out: &mut W, result: Result<()>) -> Result<()> {
    match result {
        Ok(()) | Err(Error::Api(_)) => Ok(()),
        Err(Error::Io(e)) => Err(Error::Io(e)),
        Err(Error::Form(e)) => {
            writeln!(out, "⚠️  {e}")?;
            Ok(())
        }
        Err(e) => {
            tracing::debug!(error = %e, "Wizard action refused");
            writeln!(out, "⚠️  {e}")?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use secrecy::SecretString;

    use super::*;
    use crate::api::{BotApi, BotInfo, CreateBotRequest, PremiumSetupRequest};
    use crate::error::ApiError;
    use crate::notify::{CollectingNotifier, NotificationSink};
    use crate::wizard::state::tests::{sample_bot_info, sample_created_bot};

    #[derive(Default)]
    struct StubApi {
        validate_calls: AtomicUsize,
        create_names: std::sync::Mutex<Vec<String>>,
        create_descriptions: std::sync::Mutex<Vec<Option<String>>>,
        premium_calls: AtomicUsize,
    }

    #[async_trait]
    impl BotApi for StubApi {
        async fn validate_token(
            &self,
            _bot_token: &SecretString,
        ) -> std::result::Result<BotInfo, ApiError> {
            self.validate_calls.fetch_add(1, Ordering::SeqCst);
            Ok(sample_bot_info(42))
        }

        async fn create_bot(
            &self,
            request: &CreateBotRequest<'_>,
        ) -> std::result::Result<CreatedBot, ApiError> {
            self.create_names
                .lock()
                .unwrap()
                .push(request.name.to_string());
            self.create_descriptions
                .lock()
                .unwrap()
                .push(request.description.map(str::to_string));
            Ok(sample_created_bot(7))
        }

        async fn setup_premium_chatbot(
            &self,
            _bot_id: i64,
            _request: &PremiumSetupRequest,
        ) -> std::result::Result<serde_json::Value, ApiError> {
            self.premium_calls.fetch_add(1, Ordering::SeqCst);
            Ok(serde_json::json!({}))
        }
    }

    fn wizard() -> (SetupWizard, Arc<StubApi>) {
        let api = Arc::new(StubApi::default());
        let notifier: Arc<dyn NotificationSink> = Arc::new(CollectingNotifier::new());
        let wizard = SetupWizard::new(
            Arc::clone(&api) as Arc<dyn BotApi>,
            notifier,
            "https://app.example.com",
        );
        (wizard, api)
    }

    #[tokio::test]
    async fn full_session_walks_every_step() {
        let (wizard, api) = wizard();
        // token, default name, no description, create, set up, dashboard
        let input: &[u8] = b"123:ABC\n\n\n\n\n\n";
        let mut out = Vec::new();

        let created = run(&wizard, input, &mut out).await.unwrap();
        assert_eq!(created.map(|b| b.id), Some(7));
        assert_eq!(api.create_names.lock().unwrap().as_slice(), ["Helper"]);
        assert_eq!(api.premium_calls.load(Ordering::SeqCst), 1);

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("🎉 Setup Complete!"));
        assert!(text.contains("Dashboard: https://app.example.com"));
        assert!(!text.contains("123:ABC"));
        // Reset after the dashboard action.
        assert_eq!(wizard.step().await, WizardStep::ValidateToken);
    }

    #[tokio::test]
    async fn empty_token_shows_field_error_and_skips_api() {
        let (wizard, api) = wizard();
        let input: &[u8] = b"\nq\n";
        let mut out = Vec::new();

        let created = run(&wizard, input, &mut out).await.unwrap();
        assert!(created.is_none());
        assert_eq!(api.validate_calls.load(Ordering::SeqCst), 0);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("⚠️  Bot token is required"));
    }

    #[tokio::test]
    async fn back_then_enter_reuses_token() {
        let (wizard, api) = wizard();
        // token, name, description, back, reuse token, then EOF
        let input: &[u8] = b"123:ABC\nSupport\nHelps\nback\n\n";
        let mut out = Vec::new();

        run(&wizard, input, &mut out).await.unwrap();
        assert_eq!(api.validate_calls.load(Ordering::SeqCst), 2);
        let state = wizard.snapshot().await;
        assert_eq!(state.step.number(), 2);
        assert_eq!(state.form.bot_name, "Support");
    }

    #[tokio::test]
    async fn description_can_be_cleared_after_back() {
        let (wizard, api) = wizard();
        // token, name, description, back, reuse token, keep name, clear description, create
        let input: &[u8] = b"123:ABC\nSupport\nHelps\nback\n\n\n-\n\n";
        let mut out = Vec::new();

        run(&wizard, input, &mut out).await.unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Description (optional) [Helps], '-' to clear: "));

        assert_eq!(api.create_names.lock().unwrap().as_slice(), ["Support"]);
        assert_eq!(
            api.create_descriptions.lock().unwrap().as_slice(),
            [None::<String>]
        );
        let state = wizard.snapshot().await;
        assert_eq!(state.step.number(), 3);
        assert!(state.form.description.is_empty());
    }

    #[tokio::test]
    async fn blank_description_keeps_previous_value() {
        let (wizard, api) = wizard();
        // token, name, description, back, reuse token, keep name, keep description, create
        let input: &[u8] = b"123:ABC\nSupport\nHelps\nback\n\n\n\n\n";
        let mut out = Vec::new();

        run(&wizard, input, &mut out).await.unwrap();
        assert_eq!(
            api.create_descriptions.lock().unwrap().as_slice(),
            [Some("Helps".to_string())]
        );
    }
}
