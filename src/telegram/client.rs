//! Minimal Telegram Bot API client over JSON POST.

use super::types::{ApiResponse, Message, Update, User};
use crate::bot::{ChatTransport, Format, MenuOption, MessageId};
use crate::config::TelegramSettings;
use crate::error::{Result, TldwError};
use crate::store::ChatId;
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

/// Longest text a single message may carry.
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Slack added to the HTTP timeout on top of the long-poll timeout.
const POLL_GRACE_SECS: u64 = 15;

/// Menu buttons per keyboard row.
const BUTTONS_PER_ROW: usize = 2;

pub struct TelegramClient {
    http: HttpClient,
    base_url: String,
    poll_timeout_secs: u64,
}

impl TelegramClient {
    pub fn new(settings: &TelegramSettings, token: &str) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(settings.poll_timeout_secs + POLL_GRACE_SECS))
            .user_agent(concat!("tldw/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TldwError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: format!("{}/bot{}", settings.api_base.trim_end_matches('/'), token),
            poll_timeout_secs: settings.poll_timeout_secs,
        })
    }

    /// Call a Bot API method and unwrap its `result`.
    async fn call<T: DeserializeOwned>(&self, method: &str, body: Value) -> Result<T> {
        let response = self
            .http
            .post(format!("{}/{}", self.base_url, method))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let payload = response.text().await?;
        let parsed: ApiResponse<T> = serde_json::from_str(&payload).map_err(|e| {
            TldwError::Transport(format!("{} returned {} with unreadable body: {}", method, status, e))
        })?;

        if !parsed.ok {
            return Err(TldwError::Transport(format!(
                "{} failed ({}): {}",
                method,
                parsed.error_code.unwrap_or(status.as_u16() as i64),
                parsed.description.unwrap_or_else(|| "unknown error".to_string())
            )));
        }

        parsed
            .result
            .ok_or_else(|| TldwError::Transport(format!("{} returned no result", method)))
    }

    pub async fn get_me(&self) -> Result<User> {
        self.call("getMe", json!({})).await
    }

    /// Long-poll for updates after `offset`.
    pub async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>> {
        let mut body = json!({
            "timeout": self.poll_timeout_secs,
            "allowed_updates": ["message", "callback_query"],
        });
        if let Some(offset) = offset {
            body["offset"] = json!(offset);
        }
        self.call("getUpdates", body).await
    }

    pub async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        parse_mode: Option<&str>,
        reply_markup: Option<Value>,
    ) -> Result<Message> {
        let mut body = json!({ "chat_id": chat_id, "text": text });
        if let Some(mode) = parse_mode {
            body["parse_mode"] = json!(mode);
        }
        if let Some(markup) = reply_markup {
            body["reply_markup"] = markup;
        }
        self.call("sendMessage", body).await
    }

    pub async fn delete_message(&self, chat_id: ChatId, message_id: MessageId) -> Result<()> {
        let _: bool = self
            .call(
                "deleteMessage",
                json!({ "chat_id": chat_id, "message_id": message_id }),
            )
            .await?;
        Ok(())
    }

    pub async fn answer_callback_query(&self, query_id: &str) -> Result<()> {
        let _: bool = self
            .call("answerCallbackQuery", json!({ "callback_query_id": query_id }))
            .await?;
        Ok(())
    }

    pub async fn send_chat_action(&self, chat_id: ChatId, action: &str) -> Result<()> {
        let _: bool = self
            .call("sendChatAction", json!({ "chat_id": chat_id, "action": action }))
            .await?;
        Ok(())
    }

    /// Send one piece, falling back to plain text when the markup is rejected.
    async fn send_piece(&self, chat: ChatId, text: &str, format: Format) -> Result<Message> {
        match format {
            Format::Plain => self.send_message(chat, text, None, None).await,
            Format::Markdown => match self.send_message(chat, text, Some("Markdown"), None).await {
                Err(TldwError::Transport(e)) if e.contains("can't parse entities") => {
                    warn!("Markdown rejected, retrying as plain text: {}", e);
                    self.send_message(chat, text, None, None).await
                }
                other => other,
            },
        }
    }
}

/// Split text into pieces that fit in one message, preferring line breaks.
///
/// Whitespace inside a piece is kept as written. Pieces made only of
/// whitespace are dropped, so blank text yields no pieces at all.
pub fn split_message(text: &str) -> Vec<String> {
    if text.chars().count() <= MAX_MESSAGE_CHARS {
        let mut pieces = Vec::new();
        push_piece(&mut pieces, text.to_string());
        return pieces;
    }

    let mut pieces = Vec::new();
    let mut current: Option<String> = None;
    let mut current_len = 0;

    for line in text.split('\n') {
        let line_len = line.chars().count();

        if let Some(buffer) = current.as_mut() {
            if current_len + 1 + line_len <= MAX_MESSAGE_CHARS {
                buffer.push('\n');
                buffer.push_str(line);
                current_len += 1 + line_len;
                continue;
            }
        }
        if let Some(buffer) = current.take() {
            push_piece(&mut pieces, buffer);
        }

        // A single line longer than the limit is cut by characters.
        let chars: Vec<char> = line.chars().collect();
        let mut rest = &chars[..];
        while rest.len() > MAX_MESSAGE_CHARS {
            push_piece(&mut pieces, rest[..MAX_MESSAGE_CHARS].iter().collect());
            rest = &rest[MAX_MESSAGE_CHARS..];
        }
        current = Some(rest.iter().collect());
        current_len = rest.len();
    }
    if let Some(buffer) = current {
        push_piece(&mut pieces, buffer);
    }

    pieces
}

fn push_piece(pieces: &mut Vec<String>, piece: String) {
    if !piece.trim().is_empty() {
        pieces.push(piece);
    }
}

/// Inline keyboard rows for a menu.
pub fn inline_keyboard(options: &[MenuOption]) -> Value {
    let rows: Vec<Value> = options
        .chunks(BUTTONS_PER_ROW)
        .map(|row| {
            Value::Array(
                row.iter()
                    .map(|o| json!({ "text": o.label, "callback_data": o.data }))
                    .collect(),
            )
        })
        .collect();
    json!({ "inline_keyboard": rows })
}

#[async_trait]
impl ChatTransport for TelegramClient {
    async fn send(&self, chat: ChatId, text: &str, format: Format) -> Result<MessageId> {
        let mut last = None;
        for piece in split_message(text) {
            last = Some(self.send_piece(chat, &piece, format).await?);
        }
        let message =
            last.ok_or_else(|| TldwError::Transport("Refusing to send an empty message".to_string()))?;
        debug!("Sent message {} to chat {}", message.message_id, chat);
        Ok(message.message_id)
    }

    async fn delete(&self, chat: ChatId, message: MessageId) -> Result<()> {
        self.delete_message(chat, message).await
    }

    async fn typing(&self, chat: ChatId) -> Result<()> {
        self.send_chat_action(chat, "typing").await
    }

    async fn menu(&self, chat: ChatId, text: &str, options: &[MenuOption]) -> Result<MessageId> {
        let message = self
            .send_message(chat, text, None, Some(inline_keyboard(options)))
            .await?;
        Ok(message.message_id)
    }
}
