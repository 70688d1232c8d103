//! Configuration settings for tldw.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub telegram: TelegramSettings,
    pub acquisition: AcquisitionSettings,
    pub cache: CacheSettings,
    pub llm: LlmSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Telegram Bot API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramSettings {
    /// Bot token. `TELEGRAM_BOT_TOKEN` takes precedence when set.
    pub bot_token: Option<String>,
    /// Long-polling timeout for `getUpdates`, in seconds.
    pub poll_timeout_secs: u64,
    /// Base URL of the Bot API.
    pub api_base: String,
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            bot_token: None,
            poll_timeout_secs: 30,
            api_base: "https://api.telegram.org".to_string(),
        }
    }
}

/// Caption acquisition settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionSettings {
    /// Path or name of the yt-dlp executable.
    pub ytdlp_path: String,
    /// Hard bound on a single yt-dlp invocation.
    pub timeout_secs: u64,
    /// Maximum yt-dlp stdout size accepted.
    pub max_output_bytes: usize,
    /// Transcripts shorter than this are rejected.
    pub min_transcript_chars: usize,
}

impl Default for AcquisitionSettings {
    fn default() -> Self {
        Self {
            ytdlp_path: "yt-dlp".to_string(),
            timeout_secs: 60,
            max_output_bytes: 50 * 1024 * 1024,
            min_transcript_chars: 50,
        }
    }
}

/// Lifetimes of the in-memory session and transcript stores.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub session_ttl_secs: u64,
    pub transcript_ttl_secs: u64,
    pub sweep_interval_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            session_ttl_secs: 2 * 60 * 60,
            transcript_ttl_secs: 24 * 60 * 60,
            sweep_interval_secs: 30 * 60,
        }
    }
}

impl CacheSettings {
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.session_ttl_secs as i64)
    }

    pub fn transcript_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.transcript_ttl_secs as i64)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

/// LLM (OpenAI-compatible endpoint) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Base URL of the chat completions API.
    pub api_base: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    /// Model used for every generation task.
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub request_timeout_secs: u64,
    /// Transcript budget for summaries.
    pub summary_max_chars: usize,
    /// Transcript budget for deep dives and action points.
    pub analysis_max_chars: usize,
    /// Chunk size used when narrowing a transcript for a question.
    pub answer_chunk_chars: usize,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_base: "https://openrouter.ai/api/v1".to_string(),
            api_key_env: "OPENROUTER_API_KEY".to_string(),
            model: "openai/gpt-4o-mini".to_string(),
            max_tokens: 1500,
            temperature: 0.4,
            request_timeout_secs: 300,
            summary_max_chars: 12000,
            analysis_max_chars: 10000,
            answer_chunk_chars: 8000,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory with prompt overrides (summary.toml, answer.toml, ...).
    pub custom_dir: Option<String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::TldwError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tldw")
            .join("config.toml")
    }

    /// Resolve the Telegram bot token, preferring the environment.
    pub fn telegram_token(&self) -> Option<String> {
        std::env::var("TELEGRAM_BOT_TOKEN")
            .ok()
            .filter(|t| !t.is_empty())
            .or_else(|| self.telegram.bot_token.clone().filter(|t| !t.is_empty()))
    }

    /// Resolve the LLM API key from the configured environment variable.
    pub fn llm_api_key(&self) -> Option<String> {
        std::env::var(&self.llm.api_key_env)
            .ok()
            .filter(|k| !k.is_empty())
    }
}
