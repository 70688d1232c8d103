//! Routing of inbound chat events.

use super::messages;
use super::{ChatTransport, Format, MenuOption, MessageId};
use crate::assistant::Assistant;
use crate::caption_source::{extract_video_id, is_youtube_url, VideoId};
use crate::error::Result;
use crate::language::{parse_switch_request, SUPPORTED_LANGUAGES};
use crate::store::{ChatId, ChatSession, SessionStore};
use crate::transcript::{FetchedTranscript, TranscriptService};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Callback data prefix of the language menu buttons.
const LANGUAGE_CALLBACK_PREFIX: &str = "lang_";

/// Slash commands understood by the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Clear,
    Language,
    Summary,
    DeepDive,
    ActionPoints,
}

impl Command {
    /// Parse `/name` or `/name@botname` at the start of a message.
    ///
    /// `None` means the text is not a command at all; `Some(None)` is an
    /// unknown command.
    pub fn parse(text: &str) -> Option<Option<Command>> {
        let word = text.trim_start().split_whitespace().next()?;
        let name = word.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or(name);

        let command = match name.to_lowercase().as_str() {
            "start" => Command::Start,
            "help" => Command::Help,
            "clear" => Command::Clear,
            "language" => Command::Language,
            "summary" => Command::Summary,
            "deepdive" => Command::DeepDive,
            "actionpoints" => Command::ActionPoints,
            _ => return Some(None),
        };
        Some(Some(command))
    }
}

#[derive(Debug, Clone, Copy)]
enum Analysis {
    DeepDive,
    ActionPoints,
}

/// The chat bot: one instance serves every chat.
pub struct Bot {
    store: Arc<SessionStore>,
    transcripts: TranscriptService,
    assistant: Assistant,
    transport: Arc<dyn ChatTransport>,
}

impl Bot {
    pub fn new(
        store: Arc<SessionStore>,
        transcripts: TranscriptService,
        assistant: Assistant,
        transport: Arc<dyn ChatTransport>,
    ) -> Self {
        Self {
            store,
            transcripts,
            assistant,
            transport,
        }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Handle an inbound text message.
    ///
    /// Acquisition and generation failures are answered in the chat; only
    /// transport failures come back as errors.
    #[instrument(skip(self, text, first_name))]
    pub async fn handle_message(
        &self,
        chat: ChatId,
        text: &str,
        first_name: Option<&str>,
    ) -> Result<()> {
        let text = text.trim();

        if let Some(command) = Command::parse(text) {
            return match command {
                Some(command) => self.handle_command(chat, command, first_name).await,
                None => {
                    debug!("Ignoring unknown command: {}", text);
                    Ok(())
                }
            };
        }

        if let Some((code, word)) = parse_switch_request(text) {
            return self.switch_language(chat, code, &word).await;
        }

        if is_youtube_url(text) {
            return self.handle_link(chat, text).await;
        }

        self.handle_question(chat, text).await
    }

    /// Handle a button press carrying `data`.
    #[instrument(skip(self))]
    pub async fn handle_callback(&self, chat: ChatId, data: &str) -> Result<()> {
        let Some(code) = data.strip_prefix(LANGUAGE_CALLBACK_PREFIX) else {
            debug!("Ignoring callback: {}", data);
            return Ok(());
        };

        let Some((code, _)) = SUPPORTED_LANGUAGES.iter().find(|(c, _)| *c == code) else {
            warn!("Unsupported language selected: {}", code);
            return Ok(());
        };

        self.store.set_language(chat, code);
        info!("Chat {} language set to {}", chat, code);
        self.send(chat, &messages::language_selected(code), Format::Markdown)
            .await
    }

    async fn handle_command(
        &self,
        chat: ChatId,
        command: Command,
        first_name: Option<&str>,
    ) -> Result<()> {
        match command {
            Command::Start => {
                self.send(chat, &messages::welcome(first_name), Format::Markdown)
                    .await
            }
            Command::Help => self.send(chat, messages::HELP, Format::Markdown).await,
            Command::Clear => {
                self.store.clear_session(chat);
                self.send(chat, messages::SESSION_CLEARED, Format::Plain)
                    .await
            }
            Command::Language => {
                let options: Vec<MenuOption> = SUPPORTED_LANGUAGES
                    .iter()
                    .map(|(code, _)| MenuOption {
                        label: messages::language_button(code),
                        data: format!("{}{}", LANGUAGE_CALLBACK_PREFIX, code),
                    })
                    .collect();
                self.transport
                    .menu(chat, messages::CHOOSE_LANGUAGE, &options)
                    .await?;
                Ok(())
            }
            Command::Summary => match self.store.get_session(chat).and_then(|s| s.summary) {
                Some(summary) => self.send(chat, &summary, Format::Markdown).await,
                None => self.send(chat, messages::NO_SUMMARY, Format::Plain).await,
            },
            Command::DeepDive => self.run_analysis(chat, Analysis::DeepDive).await,
            Command::ActionPoints => self.run_analysis(chat, Analysis::ActionPoints).await,
        }
    }

    async fn switch_language(&self, chat: ChatId, code: &str, word: &str) -> Result<()> {
        self.store.set_language(chat, code);
        info!("Chat {} switched language to {}", chat, code);
        self.send(chat, &messages::language_switched(code, word), Format::Plain)
            .await?;

        match self.store.get_session(chat) {
            Some(session) => self.send_summary(chat, &session).await,
            None => Ok(()),
        }
    }

    async fn handle_link(&self, chat: ChatId, text: &str) -> Result<()> {
        let Some(video) = extract_video_id(text) else {
            return self.send(chat, messages::BAD_URL, Format::Plain).await;
        };
        let language = self.store.get_language(chat);

        if let Some(cached) = self.store.get_cached_transcript(&video) {
            info!("Cache hit for {}", video);
            let session = ChatSession::new(chat, video, cached.into(), language);
            self.store.set_session(session.clone());
            self.send(chat, messages::CACHE_HIT, Format::Plain).await?;
            return self.send_summary(chat, &session).await;
        }

        let loading = self
            .transport
            .send(chat, messages::FETCHING, Format::Markdown)
            .await?;

        match self.transcripts.fetch(&video).await {
            Ok(fetched) => {
                let session = self.start_session(chat, video, fetched, language);
                self.discard(chat, loading).await;
                self.send_summary(chat, &session).await
            }
            Err(e) => {
                self.discard(chat, loading).await;
                error!("Transcript error: {}", e);
                self.send(chat, &messages::fetch_failed(&e.to_string()), Format::Markdown)
                    .await
            }
        }
    }

    fn start_session(
        &self,
        chat: ChatId,
        video: VideoId,
        fetched: FetchedTranscript,
        language: String,
    ) -> ChatSession {
        self.store.cache_transcript(&video, &fetched);
        let session = ChatSession::new(chat, video, fetched, language);
        self.store.set_session(session.clone());
        session
    }

    /// Generate, store and send the summary for the session's video.
    async fn send_summary(&self, chat: ChatId, session: &ChatSession) -> Result<()> {
        let loading = self
            .transport
            .send(chat, messages::GENERATING_SUMMARY, Format::Markdown)
            .await?;

        let result = self
            .assistant
            .summarize(&session.transcript, &session.video_title, &session.language)
            .await;
        self.discard(chat, loading).await;

        match result {
            Ok(summary) => {
                self.store
                    .update_session(chat, |s| s.summary = Some(summary.clone()));
                self.send(chat, &summary, Format::Markdown).await?;
                self.send(chat, messages::FOLLOW_UP_HINT, Format::Markdown)
                    .await
            }
            Err(e) => {
                self.send(chat, &messages::summary_failed(&e.to_string()), Format::Plain)
                    .await
            }
        }
    }

    async fn run_analysis(&self, chat: ChatId, kind: Analysis) -> Result<()> {
        let Some(session) = self.store.get_session(chat) else {
            return self.send(chat, messages::NO_VIDEO, Format::Plain).await;
        };

        let notice = match kind {
            Analysis::DeepDive => messages::DEEP_DIVE_LOADING,
            Analysis::ActionPoints => messages::ACTION_POINTS_LOADING,
        };
        let loading = self.transport.send(chat, notice, Format::Plain).await?;

        let result = match kind {
            Analysis::DeepDive => {
                self.assistant
                    .deep_dive(&session.transcript, &session.language)
                    .await
            }
            Analysis::ActionPoints => {
                self.assistant
                    .action_points(&session.transcript, &session.language)
                    .await
            }
        };
        self.discard(chat, loading).await;

        match result {
            Ok(reply) => self.send(chat, &reply, Format::Markdown).await,
            Err(_) => self.send(chat, messages::TASK_FAILED, Format::Plain).await,
        }
    }

    async fn handle_question(&self, chat: ChatId, question: &str) -> Result<()> {
        let Some(session) = self.store.get_session(chat) else {
            return self.send(chat, messages::SEND_A_LINK, Format::Plain).await;
        };

        if let Err(e) = self.transport.typing(chat).await {
            debug!("Typing indicator failed: {}", e);
        }

        match self
            .assistant
            .answer(
                question,
                &session.transcript,
                &session.video_title,
                &session.language,
            )
            .await
        {
            Ok(answer) => self.send(chat, &answer, Format::Markdown).await,
            Err(_) => self.send(chat, messages::ANSWER_FAILED, Format::Plain).await,
        }
    }

    async fn send(&self, chat: ChatId, text: &str, format: Format) -> Result<()> {
        self.transport.send(chat, text, format).await?;
        Ok(())
    }

    /// Delete a transient message; failures only get logged.
    async fn discard(&self, chat: ChatId, message: MessageId) {
        if let Err(e) = self.transport.delete(chat, message).await {
            debug!("Could not delete message {}: {}", message, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::Budgets;
    use crate::caption_source::{CaptionSource, RawCaptions};
    use crate::config::Prompts;
    use crate::error::{AcquisitionError, TldwError};
    use crate::llm::Generator;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
    use std::sync::Mutex;

    const LINK: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Sent { id: MessageId, text: String, format: Format },
        Deleted(MessageId),
        Typing,
        Menu(Vec<MenuOption>),
    }

    #[derive(Default)]
    struct Recording {
        next_id: AtomicI64,
        events: Mutex<Vec<Event>>,
    }

    impl Recording {
        fn events(&self) -> Vec<Event> {
            self.events.lock().unwrap().clone()
        }

        fn texts(&self) -> Vec<String> {
            self.events()
                .into_iter()
                .filter_map(|e| match e {
                    Event::Sent { text, .. } => Some(text),
                    _ => None,
                })
                .collect()
        }

        fn push(&self, event: Event) {
            self.events.lock().unwrap().push(event);
        }
    }

    #[async_trait]
    impl ChatTransport for Recording {
        async fn send(&self, _chat: ChatId, text: &str, format: Format) -> Result<MessageId> {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            self.push(Event::Sent {
                id,
                text: text.to_string(),
                format,
            });
            Ok(id)
        }

        async fn delete(&self, _chat: ChatId, message: MessageId) -> Result<()> {
            self.push(Event::Deleted(message));
            Ok(())
        }

        async fn typing(&self, _chat: ChatId) -> Result<()> {
            self.push(Event::Typing);
            Ok(())
        }

        async fn menu(&self, _chat: ChatId, _text: &str, options: &[MenuOption]) -> Result<MessageId> {
            self.push(Event::Menu(options.to_vec()));
            Ok(0)
        }
    }

    struct Source {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl CaptionSource for Source {
        async fn resolve(&self, _video: &VideoId) -> Result<RawCaptions> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AcquisitionError::NoCaptionTrack.into());
            }
            Ok(RawCaptions {
                content: "WEBVTT\n\n00:00:01.000 --> 00:00:04.000\nToday we talk about saving money\n\n\
                          00:01:05.000 --> 00:01:09.000\nand investing it early for retirement"
                    .to_string(),
                video_title: "Money Talk".to_string(),
            })
        }
    }

    /// Replies with the task-identifying first line of the user prompt.
    #[derive(Default)]
    struct Echo {
        fail: AtomicBool,
        systems: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Generator for Echo {
        async fn complete(&self, system: &str, user: &str) -> Result<String> {
            self.systems.lock().unwrap().push(system.to_string());
            if self.fail.load(Ordering::SeqCst) {
                return Err(TldwError::Generation("upstream down".to_string()));
            }
            Ok(format!("reply to: {}", user.lines().next().unwrap_or_default()))
        }
    }

    struct Harness {
        bot: Bot,
        transport: Arc<Recording>,
        source: Arc<Source>,
        generator: Arc<Echo>,
    }

    fn harness(fail_fetch: bool) -> Harness {
        let store = Arc::new(SessionStore::new(&Default::default()));
        let transport = Arc::new(Recording::default());
        let source = Arc::new(Source {
            calls: AtomicUsize::new(0),
            fail: fail_fetch,
        });
        let generator = Arc::new(Echo::default());
        let bot = Bot::new(
            store,
            TranscriptService::new(source.clone(), 50),
            Assistant::new(generator.clone(), Prompts::default(), Budgets::default()),
            transport.clone(),
        );
        Harness {
            bot,
            transport,
            source,
            generator,
        }
    }

    #[test]
    fn test_parse_command() {
        assert_eq!(Command::parse("/start"), Some(Some(Command::Start)));
        assert_eq!(Command::parse("/deepdive@tldw_bot now"), Some(Some(Command::DeepDive)));
        assert_eq!(Command::parse("/ActionPoints"), Some(Some(Command::ActionPoints)));
        assert_eq!(Command::parse("/nope"), Some(None));
        assert_eq!(Command::parse("hello /start"), None);
        assert_eq!(Command::parse(""), None);
    }

    #[tokio::test]
    async fn test_start_greets_by_name() {
        let h = harness(false);
        h.bot.handle_message(1, "/start", Some("Asha")).await.unwrap();
        assert!(h.transport.texts()[0].starts_with("👋 *Welcome Asha!*"));
    }

    #[tokio::test]
    async fn test_link_fetches_and_summarizes() {
        let h = harness(false);
        h.bot.handle_message(1, LINK, None).await.unwrap();

        let events = h.transport.events();
        assert_eq!(
            events[0],
            Event::Sent {
                id: 1,
                text: messages::FETCHING.to_string(),
                format: Format::Markdown
            }
        );
        assert_eq!(events[1], Event::Deleted(1));
        assert!(matches!(&events[2], Event::Sent { text, .. } if text == messages::GENERATING_SUMMARY));
        assert_eq!(events[3], Event::Deleted(2));
        assert!(matches!(&events[4], Event::Sent { text, format: Format::Markdown, .. }
            if text.starts_with("reply to: Summarize this YouTube video titled \"Money Talk\"")));
        assert!(matches!(&events[5], Event::Sent { text, .. } if text == messages::FOLLOW_UP_HINT));

        let session = h.bot.store().get_session(1).unwrap();
        assert_eq!(session.video_id.as_str(), "dQw4w9WgXcQ");
        assert!(session.transcript.starts_with("[0:01] Today we talk"));
        assert!(session.summary.unwrap().starts_with("reply to: Summarize"));
        assert!(h.bot.store().get_cached_transcript(&session.video_id).is_some());
    }

    #[tokio::test]
    async fn test_second_chat_uses_cache() {
        let h = harness(false);
        h.bot.handle_message(1, LINK, None).await.unwrap();
        h.bot.handle_message(2, "https://youtu.be/dQw4w9WgXcQ", None).await.unwrap();

        assert_eq!(h.source.calls.load(Ordering::SeqCst), 1);
        assert!(h.transport.texts().contains(&messages::CACHE_HIT.to_string()));
        assert!(h.bot.store().get_session(2).unwrap().summary.is_some());
    }

    #[tokio::test]
    async fn test_fetch_failure_is_reported() {
        let h = harness(true);
        h.bot.handle_message(1, LINK, None).await.unwrap();

        let events = h.transport.events();
        assert_eq!(events[1], Event::Deleted(1));
        let texts = h.transport.texts();
        let last = texts.last().unwrap();
        assert!(last.starts_with("❌ *Error:* Could not get transcript: No subtitle URL found"));
        assert!(last.contains("Make sure the video has CC/subtitles."));
        assert!(h.bot.store().get_session(1).is_none());
    }

    #[tokio::test]
    async fn test_question_without_session() {
        let h = harness(false);
        h.bot.handle_message(1, "what is this about?", None).await.unwrap();
        assert_eq!(h.transport.texts(), vec![messages::SEND_A_LINK.to_string()]);
    }

    #[tokio::test]
    async fn test_question_is_answered() {
        let h = harness(false);
        h.bot.handle_message(1, LINK, None).await.unwrap();
        h.bot
            .handle_message(1, "What did they say about money?", None)
            .await
            .unwrap();

        let events = h.transport.events();
        assert!(events.contains(&Event::Typing));
        let last = h.transport.texts().pop().unwrap();
        assert_eq!(last, "reply to: Video: \"Money Talk\"");
    }

    #[tokio::test]
    async fn test_generation_failure_keeps_session() {
        let h = harness(false);
        h.bot.handle_message(1, LINK, None).await.unwrap();
        h.generator.fail.store(true, Ordering::SeqCst);

        h.bot.handle_message(1, "and then?", None).await.unwrap();
        assert_eq!(h.transport.texts().pop().unwrap(), messages::ANSWER_FAILED);
        assert!(h.bot.store().get_session(1).is_some());

        h.bot.handle_message(1, "/deepdive", None).await.unwrap();
        assert_eq!(h.transport.texts().pop().unwrap(), messages::TASK_FAILED);
    }

    #[tokio::test]
    async fn test_summary_failure_is_reported() {
        let h = harness(false);
        h.generator.fail.store(true, Ordering::SeqCst);
        h.bot.handle_message(1, LINK, None).await.unwrap();

        assert_eq!(
            h.transport.texts().pop().unwrap(),
            "❌ Error generating summary: AI error: upstream down"
        );
        let session = h.bot.store().get_session(1).unwrap();
        assert_eq!(session.summary, None);
    }

    #[tokio::test]
    async fn test_summary_command() {
        let h = harness(false);
        h.bot.handle_message(1, "/summary", None).await.unwrap();
        assert_eq!(h.transport.texts().pop().unwrap(), messages::NO_SUMMARY);

        h.bot.handle_message(1, LINK, None).await.unwrap();
        let stored = h.bot.store().get_session(1).unwrap().summary.unwrap();
        h.bot.handle_message(1, "/summary", None).await.unwrap();
        assert_eq!(h.transport.texts().pop().unwrap(), stored);
    }

    #[tokio::test]
    async fn test_analysis_commands() {
        let h = harness(false);
        h.bot.handle_message(1, "/actionpoints", None).await.unwrap();
        assert_eq!(h.transport.texts().pop().unwrap(), messages::NO_VIDEO);

        h.bot.handle_message(1, LINK, None).await.unwrap();
        h.bot.handle_message(1, "/deepdive", None).await.unwrap();
        assert!(h.transport.texts().pop().unwrap().contains("DEEP DIVE"));

        h.bot.handle_message(1, "/actionpoints", None).await.unwrap();
        let events = h.transport.events();
        let n = events.len();
        assert!(matches!(&events[n - 3], Event::Sent { text, .. } if text == messages::ACTION_POINTS_LOADING));
        assert!(matches!(events[n - 2], Event::Deleted(_)));
        assert!(matches!(&events[n - 1], Event::Sent { text, .. } if text.contains("action items")));
    }

    #[tokio::test]
    async fn test_language_switch_regenerates_summary() {
        let h = harness(false);
        h.bot.handle_message(1, LINK, None).await.unwrap();
        h.bot.handle_message(1, "Summarize in Hindi", None).await.unwrap();

        assert_eq!(h.bot.store().get_language(1), "hi");
        assert_eq!(h.bot.store().get_session(1).unwrap().language, "hi");
        assert!(h
            .transport
            .texts()
            .contains(&"✅ भाषा हिंदी में बदल दी गई! 🇮🇳".to_string()));
        let last_system = h.generator.systems.lock().unwrap().last().cloned().unwrap();
        assert!(last_system.contains("Hindi"));
    }

    #[tokio::test]
    async fn test_language_switch_without_session() {
        let h = harness(false);
        h.bot.handle_message(1, "explain in Tamil", None).await.unwrap();

        assert_eq!(h.bot.store().get_language(1), "ta");
        assert_eq!(
            h.transport.texts(),
            vec!["✅ Language switched! I'll now respond in Tamil.".to_string()]
        );
    }

    #[tokio::test]
    async fn test_language_menu_and_callback() {
        let h = harness(false);
        h.bot.handle_message(1, "/language", None).await.unwrap();
        let Event::Menu(options) = h.transport.events().remove(0) else {
            panic!("expected a menu");
        };
        assert_eq!(options.len(), 6);
        assert_eq!(options[1].data, "lang_hi");

        h.bot.handle_callback(1, "lang_te").await.unwrap();
        assert_eq!(h.bot.store().get_language(1), "te");
        assert_eq!(h.transport.texts().pop().unwrap(), "✅ Language set to *Telugu*!");

        h.bot.handle_callback(1, "lang_xx").await.unwrap();
        assert_eq!(h.bot.store().get_language(1), "te");
    }

    #[tokio::test]
    async fn test_clear_removes_session() {
        let h = harness(false);
        h.bot.handle_message(1, LINK, None).await.unwrap();
        h.bot.handle_message(1, "/clear", None).await.unwrap();

        assert!(h.bot.store().get_session(1).is_none());
        assert_eq!(h.transport.texts().pop().unwrap(), messages::SESSION_CLEARED);
    }
}
