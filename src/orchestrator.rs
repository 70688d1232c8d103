//! Wiring of the bot's components from settings.

use crate::assistant::{Assistant, Budgets};
use crate::bot::{Bot, ChatTransport};
use crate::caption_source::{CaptionSource, YtDlpSource};
use crate::config::{Prompts, Settings};
use crate::error::{Result, TldwError};
use crate::llm::{Generator, OpenAIGenerator};
use crate::store::{SessionStore, Sweeper};
use crate::transcript::TranscriptService;
use std::sync::Arc;
use tracing::info;

/// Owns the shared components and builds bots on top of them.
pub struct Orchestrator {
    settings: Settings,
    prompts: Prompts,
    source: Arc<dyn CaptionSource>,
    generator: Arc<dyn Generator>,
    store: Arc<SessionStore>,
}

impl Orchestrator {
    /// Build the production components: yt-dlp captions and the configured LLM.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(settings.prompts.custom_dir.as_deref())?;

        let api_key = settings.llm_api_key().ok_or_else(|| {
            TldwError::Config(format!("{} is not set", settings.llm.api_key_env))
        })?;
        let generator = OpenAIGenerator::new(&settings.llm, &api_key)?;
        info!("Using model {} at {}", generator.model(), settings.llm.api_base);

        let source = YtDlpSource::new(&settings.acquisition)?;

        Ok(Self::with_components(
            settings,
            prompts,
            Arc::new(source),
            Arc::new(generator),
        ))
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        source: Arc<dyn CaptionSource>,
        generator: Arc<dyn Generator>,
    ) -> Self {
        let store = Arc::new(SessionStore::new(&settings.cache));
        Self {
            settings,
            prompts,
            source,
            generator,
            store,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> Arc<SessionStore> {
        self.store.clone()
    }

    pub fn transcript_service(&self) -> TranscriptService {
        TranscriptService::new(
            self.source.clone(),
            self.settings.acquisition.min_transcript_chars,
        )
    }

    pub fn assistant(&self) -> Assistant {
        Assistant::new(
            self.generator.clone(),
            self.prompts.clone(),
            Budgets::from_settings(&self.settings.llm),
        )
    }

    /// A bot delivering through `transport`, sharing this orchestrator's store.
    pub fn bot(&self, transport: Arc<dyn ChatTransport>) -> Bot {
        Bot::new(
            self.store(),
            self.transcript_service(),
            self.assistant(),
            transport,
        )
    }

    /// Start periodic eviction on the shared store.
    pub fn start_sweeper(&self) -> Sweeper {
        Sweeper::start(self.store(), self.settings.cache.sweep_interval())
    }
}
