use std::sync::Arc;

use chatbot_setup::api::HttpBotApi;
use chatbot_setup::cli;
use chatbot_setup::config::SetupConfig;
use chatbot_setup::credentials::{CredentialProvider, EnvCredentials};
use chatbot_setup::notify::ConsoleNotifier;
use chatbot_setup::wizard::SetupWizard;
use tokio::io::BufReader;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = SetupConfig::from_env()?;

    let credentials = EnvCredentials::new(config.access_token_var.clone());
    if credentials.access_token().is_none() {
        eprintln!("Warning: {} is not set", credentials.var());
        eprintln!("  export {}=<your session access token>", credentials.var());
    }

    eprintln!("🤖 Chatbot Setup v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: {}", config.api_base_url);
    eprintln!("   Webhook origin: {}\n", config.origin);

    let api = HttpBotApi::from_config(&config, Arc::new(credentials))?;
    let wizard = SetupWizard::new(
        Arc::new(api),
        Arc::new(ConsoleNotifier),
        config.origin.clone(),
    )
    .on_bot_created(|bot| {
        tracing::info!(bot_id = bot.id, name = %bot.name, "Bot record created");
    });

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stderr = std::io::stderr();
    match cli::run(&wizard, stdin, &mut stderr).await? {
        Some(bot) => eprintln!("\nBot {} (id {}) is set up.", bot.name, bot.id),
        None => eprintln!("\nSetup ended before a bot was created."),
    }

    Ok(())
}
