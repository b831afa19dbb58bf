//! Plain-text rendering of the wizard.

use secrecy::ExposeSecret;

use super::controller::WizardState;
use super::state::WizardStep;

pub const TITLE: &str = "Setup Telegram Premium Chatbot";
pub const SUBTITLE: &str =
    "Connect your Telegram bot to provide AI-powered responses in private chats";

/// Labels under the progress indicator, one per step.
pub const STEP_LABELS: [&str; 4] = [
    "Validate Token",
    "Configure Bot",
    "Create Bot",
    "Setup Complete",
];

const TOKEN_PLACEHOLDER: &str = "1234567890:ABCdefGHIjklMNOpqrsTUVwxyz";

const NEXT_STEPS: [&str; 5] = [
    "Go to your Telegram Business settings",
    "Enable the \"Chatbot\" feature",
    "Select your bot from the list",
    "Configure auto-reply settings",
    "Test by sending a message to your bot in a private chat",
];

/// Render the whole wizard for the current state.
///
/// The bot token is never written out; at most a mask of its length.
pub fn render(state: &WizardState) -> String {
    let mut lines = vec![TITLE.to_string(), SUBTITLE.to_string(), String::new()];
    lines.push(render_progress(state.step.number()));

    match &state.step {
        WizardStep::ValidateToken => lines.extend(render_validate_token(state)),
        WizardStep::ConfigureBot { bot_info } => {
            lines.push("✅ Bot Token Validated!".to_string());
            lines.push(format!("  Bot Name: {}", bot_info.first_name));
            lines.push(format!("  Username: @{}", bot_info.username));
            lines.push(format!("  ID: {}", bot_info.id));
            lines.push(format!(
                "  Capabilities: groups {}, reads all group messages {}, inline queries {}, premium chatbot ready {}",
                yes_no(bot_info.can_join_groups),
                yes_no(bot_info.can_read_all_group_messages),
                yes_no(bot_info.supports_inline_queries),
                yes_no(bot_info.premium_chatbot_ready),
            ));
            lines.push(String::new());

            let instructions: Vec<&str> = bot_info
                .setup_instructions
                .steps()
                .into_iter()
                .filter(|s| !s.trim().is_empty())
                .collect();
            if !instructions.is_empty() {
                lines.push("Telegram setup:".to_string());
                lines.extend(numbered(&instructions));
                lines.push(String::new());
            }

            lines.push(format!(
                "Bot Display Name: {}",
                field_or(&state.form.bot_name, "My AI Assistant")
            ));
            lines.push(format!(
                "Description (Optional): {}",
                field_or(&state.form.description, "Describe what your bot does...")
            ));
            let create = if state.is_creating {
                "Creating..."
            } else {
                "Create Bot"
            };
            lines.push(format!("[Back]  [{create}]"));
        }
        WizardStep::PremiumSetup { .. } => {
            let setup = if state.is_configuring {
                "Setting up..."
            } else {
                "Setup Premium Chatbot"
            };
            lines.extend([
                "🎉 Bot Created Successfully!".to_string(),
                "Your bot is ready. Now let's set it up for Telegram Premium Chatbot feature."
                    .to_string(),
                String::new(),
                "Setup Premium Chatbot".to_string(),
                "This will configure your bot to work with Telegram's Premium Chatbot feature,"
                    .to_string(),
                "allowing it to automatically respond in private chats.".to_string(),
                format!("[{setup}]"),
            ]);
        }
        WizardStep::Complete { .. } => {
            lines.push("🎉 Setup Complete!".to_string());
            lines.push("Your Telegram Premium Chatbot is now ready to use!".to_string());
            lines.push(String::new());
            lines.push("Next Steps:".to_string());
            lines.extend(numbered(&NEXT_STEPS));
            lines.extend([
                String::new(),
                "💡 Pro Tip".to_string(),
                "You can customize your bot's personality and responses in the bot settings."
                    .to_string(),
                "The AI will automatically generate responses based on your configuration."
                    .to_string(),
                "[Go to Bot Dashboard]".to_string(),
            ]);
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// `●1 ━━ ●2 ── ○3 ── ○4` with reached steps filled and labels beneath.
pub fn render_progress(current: u8) -> String {
    let mut markers = String::new();
    for n in 1..=4u8 {
        markers.push(if current >= n { '●' } else { '○' });
        markers.push_str(&n.to_string());
        if n < 4 {
            markers.push_str(if current > n { " ━━ " } else { " ── " });
        }
    }
    format!("{markers}\n{}\n", STEP_LABELS.join(" | "))
}

fn render_validate_token(state: &WizardState) -> Vec<String> {
    let shown = match state.form.bot_token() {
        Some(token) if state.form.has_bot_token() => {
            "•".repeat(token.expose_secret().chars().count())
        }
        _ => TOKEN_PLACEHOLDER.to_string(),
    };

    let button = if state.is_validating {
        "Validating..."
    } else {
        "Validate Token"
    };
    let disabled = state.is_validating || !state.form.has_bot_token();

    vec![
        "Step 1: Get Your Bot Token".to_string(),
        "  1. Message @BotFather on Telegram (https://t.me/BotFather)".to_string(),
        "  2. Send /newbot command".to_string(),
        "  3. Follow the instructions to create your bot".to_string(),
        "  4. Copy the bot token you receive".to_string(),
        String::new(),
        format!("Bot Token: {shown}"),
        if disabled {
            format!("[{button}] (disabled)")
        } else {
            format!("[{button}]")
        },
    ]
}

fn numbered(items: &[&str]) -> Vec<String> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("  {}. {item}", i + 1))
        .collect()
}

fn field_or<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.trim().is_empty() {
        placeholder
    } else {
        value
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}
