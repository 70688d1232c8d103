//! Telegram bot command.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::telegram::{Poller, TelegramClient};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

/// Run the bot until Ctrl-C.
pub async fn run_bot(settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Run, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'tldw doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let token = settings
        .telegram_token()
        .context("Telegram bot token is not configured")?;
    let orchestrator = Orchestrator::new(settings)?;
    let client = Arc::new(TelegramClient::new(&orchestrator.settings().telegram, &token)?);

    let me = client
        .get_me()
        .await
        .context("Could not reach the Telegram Bot API; check the bot token")?;
    let name = me.username.unwrap_or(me.first_name);

    let bot = Arc::new(orchestrator.bot(client.clone()));
    let sweeper = orchestrator.start_sweeper();

    Output::success(&format!("Bot @{} is running. Press Ctrl-C to stop.", name));
    info!("Bot @{} started", name);

    Poller::new(client, bot)
        .run(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;

    sweeper.shutdown().await;
    Output::info("Goodbye!");
    Ok(())
}
