//! Telegram transport: Bot API client and long-polling loop.

mod client;
mod poller;
pub mod types;

pub use client::{inline_keyboard, split_message, TelegramClient, MAX_MESSAGE_CHARS};
pub use poller::Poller;
