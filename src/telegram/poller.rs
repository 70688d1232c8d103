//! Long-polling update loop.

use super::types::{Inbound, Update};
use super::TelegramClient;
use crate::bot::Bot;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Pause before polling again after a failed `getUpdates`.
const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Fetches updates and hands each one to the bot on its own task.
pub struct Poller {
    client: Arc<TelegramClient>,
    bot: Arc<Bot>,
    offset: Option<i64>,
}

impl Poller {
    pub fn new(client: Arc<TelegramClient>, bot: Arc<Bot>) -> Self {
        Self {
            client,
            bot,
            offset: None,
        }
    }

    /// Poll until `shutdown` resolves.
    pub async fn run(mut self, shutdown: impl Future<Output = ()>) {
        tokio::pin!(shutdown);

        loop {
            let updates = tokio::select! {
                _ = &mut shutdown => {
                    info!("Polling stopped");
                    return;
                }
                result = self.client.get_updates(self.offset) => result,
            };

            match updates {
                Ok(updates) => {
                    if !updates.is_empty() {
                        debug!("Received {} updates", updates.len());
                    }
                    for update in updates {
                        self.dispatch(update);
                    }
                }
                Err(e) => {
                    error!("Polling error: {}", e);
                    tokio::select! {
                        _ = &mut shutdown => return,
                        _ = tokio::time::sleep(RETRY_DELAY) => {}
                    }
                }
            }
        }
    }

    fn dispatch(&mut self, update: Update) {
        self.offset = Some(next_offset(self.offset, update.update_id));

        let Some(inbound) = update.into_inbound() else {
            return;
        };

        let client = self.client.clone();
        let bot = self.bot.clone();
        tokio::spawn(async move {
            if let Err(e) = handle(&client, &bot, inbound).await {
                error!("Update handling failed: {}", e);
            }
        });
    }
}

async fn handle(client: &TelegramClient, bot: &Bot, inbound: Inbound) -> crate::Result<()> {
    match inbound {
        Inbound::Text {
            chat_id,
            text,
            first_name,
        } => bot.handle_message(chat_id, &text, first_name.as_deref()).await,
        Inbound::Callback {
            query_id,
            chat_id,
            data,
        } => {
            if let Err(e) = client.answer_callback_query(&query_id).await {
                warn!("Could not answer callback query: {}", e);
            }
            match (chat_id, data) {
                (Some(chat_id), Some(data)) => bot.handle_callback(chat_id, &data).await,
                _ => Ok(()),
            }
        }
    }
}

/// Offset acknowledging every update up to and including `update_id`.
fn next_offset(current: Option<i64>, update_id: i64) -> i64 {
    current.map_or(update_id + 1, |o| o.max(update_id + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_offset() {
        assert_eq!(next_offset(None, 10), 11);
        assert_eq!(next_offset(Some(11), 12), 13);
        assert_eq!(next_offset(Some(20), 12), 20);
    }
}
