//! Interactive terminal chat, driving the same bot as Telegram.

use crate::bot::{ChatTransport, Format, MenuOption, MessageId};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::Result;
use crate::orchestrator::Orchestrator;
use crate::store::ChatId;
use async_trait::async_trait;
use console::style;
use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// The terminal is a single chat.
const TERMINAL_CHAT: ChatId = 0;

/// Prints bot output to stdout.
#[derive(Default)]
struct ConsoleTransport {
    next_id: AtomicI64,
}

#[async_trait]
impl ChatTransport for ConsoleTransport {
    async fn send(&self, _chat: ChatId, text: &str, _format: Format) -> Result<MessageId> {
        Output::bot_reply(text);
        Ok(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    async fn delete(&self, _chat: ChatId, _message: MessageId) -> Result<()> {
        Ok(())
    }

    async fn typing(&self, _chat: ChatId) -> Result<()> {
        println!("{}", style("tldw is typing...").dim());
        Ok(())
    }

    async fn menu(&self, _chat: ChatId, text: &str, options: &[MenuOption]) -> Result<MessageId> {
        Output::bot_reply(text);
        for option in options {
            Output::kv(&option.data, &option.label);
        }
        println!("{}\n", style("Type one of the codes above to choose.").dim());
        Ok(self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

/// Run the interactive chat command.
pub async fn run_chat(settings: Settings) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(Operation::Chat, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'tldw doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;
    let bot = orchestrator.bot(Arc::new(ConsoleTransport::default()));
    let sweeper = orchestrator.start_sweeper();

    println!("\n{}", style("tldw chat").bold().cyan());
    println!(
        "{}\n",
        style("Paste a YouTube link, ask questions, or use /help. Type 'exit' to quit.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        let result = if input.starts_with("lang_") {
            bot.handle_callback(TERMINAL_CHAT, input).await
        } else {
            bot.handle_message(TERMINAL_CHAT, input, None).await
        };

        if let Err(e) = result {
            Output::error(&format!("Error: {}", e));
        }
    }

    sweeper.shutdown().await;
    Ok(())
}
