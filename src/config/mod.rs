//! Configuration module for tldw.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{PromptPair, Prompts};
pub use settings::{
    AcquisitionSettings, CacheSettings, GeneralSettings, LlmSettings, PromptSettings, Settings,
    TelegramSettings,
};
