//! Transport-agnostic chat bot.
//!
//! [`Bot`] turns inbound chat events into store updates, transcript fetches
//! and generated replies. Delivery goes through a [`ChatTransport`], which
//! the Telegram client and the terminal chat both implement.

mod dispatcher;
pub mod messages;

pub use dispatcher::{Bot, Command};

use crate::error::Result;
use crate::store::ChatId;
use async_trait::async_trait;

/// Transport-assigned identifier of a sent message.
pub type MessageId = i64;

/// How the transport should interpret outgoing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Plain,
    /// Lightweight markup (`*bold*`, `_italic_`).
    Markdown,
}

/// A selectable option: button label and the callback data it sends back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuOption {
    pub label: String,
    pub data: String,
}

/// Outbound side of a chat platform.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send a message and return its id.
    async fn send(&self, chat: ChatId, text: &str, format: Format) -> Result<MessageId>;

    async fn delete(&self, chat: ChatId, message: MessageId) -> Result<()>;

    /// Show a "typing" indicator.
    async fn typing(&self, chat: ChatId) -> Result<()>;

    /// Send a message with selectable options.
    async fn menu(&self, chat: ChatId, text: &str, options: &[MenuOption]) -> Result<MessageId>;
}
