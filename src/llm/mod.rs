//! Text generation against an OpenAI-compatible chat completions API.

mod client;
mod openai;

pub use client::{create_client, OPENROUTER_REFERER, OPENROUTER_TITLE};
pub use openai::OpenAIGenerator;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for single-turn text generation.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Run one system + user prompt and return the reply text.
    async fn complete(&self, system: &str, user: &str) -> Result<String>;
}
