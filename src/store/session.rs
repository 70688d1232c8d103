//! Per-chat sessions, the shared transcript cache and language preferences.

use super::timed::TimedCache;
use crate::caption_source::VideoId;
use crate::config::CacheSettings;
use crate::language::DEFAULT_LANGUAGE;
use crate::transcript::FetchedTranscript;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info};

/// Chat identity as assigned by the transport.
pub type ChatId = i64;

/// The video a chat is currently talking about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    pub chat_id: ChatId,
    pub video_id: VideoId,
    /// Own copy of the transcript, independent of the transcript cache.
    pub transcript: String,
    pub video_title: String,
    pub language: String,
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ChatSession {
    pub fn new(
        chat_id: ChatId,
        video_id: VideoId,
        fetched: FetchedTranscript,
        language: impl Into<String>,
    ) -> Self {
        Self {
            chat_id,
            video_id,
            transcript: fetched.transcript,
            video_title: fetched.video_title,
            language: language.into(),
            summary: None,
            created_at: Utc::now(),
        }
    }
}

/// A transcript kept for reuse across chats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedTranscript {
    pub video_id: VideoId,
    pub transcript: String,
    pub video_title: String,
    pub cached_at: DateTime<Utc>,
}

impl From<CachedTranscript> for FetchedTranscript {
    fn from(cached: CachedTranscript) -> Self {
        FetchedTranscript {
            transcript: cached.transcript,
            video_title: cached.video_title,
        }
    }
}

/// Counts of entries removed by one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub sessions: usize,
    pub transcripts: usize,
}

/// In-memory state of the bot.
///
/// Sessions (keyed by chat) and cached transcripts (keyed by video) expire
/// independently. Language preferences never expire and outlive sessions.
pub struct SessionStore {
    sessions: TimedCache<ChatId, ChatSession>,
    transcripts: TimedCache<VideoId, CachedTranscript>,
    languages: Mutex<HashMap<ChatId, String>>,
}

impl SessionStore {
    pub fn new(settings: &CacheSettings) -> Self {
        Self::with_ttls(settings.session_ttl(), settings.transcript_ttl())
    }

    pub fn with_ttls(session_ttl: Duration, transcript_ttl: Duration) -> Self {
        Self {
            sessions: TimedCache::new(session_ttl),
            transcripts: TimedCache::new(transcript_ttl),
            languages: Mutex::new(HashMap::new()),
        }
    }

    /// Store a session; its lifetime starts at `session.created_at`.
    pub fn set_session(&self, session: ChatSession) {
        let created_at = session.created_at;
        self.sessions.insert_at(session.chat_id, session, created_at);
    }

    pub fn get_session(&self, chat_id: ChatId) -> Option<ChatSession> {
        self.get_session_at(chat_id, Utc::now())
    }

    pub fn get_session_at(&self, chat_id: ChatId, now: DateTime<Utc>) -> Option<ChatSession> {
        self.sessions.get_at(&chat_id, now)
    }

    /// Modify the live session for a chat; does nothing if there is none.
    pub fn update_session<F>(&self, chat_id: ChatId, f: F) -> bool
    where
        F: FnOnce(&mut ChatSession),
    {
        self.sessions.update(&chat_id, f)
    }

    pub fn clear_session(&self, chat_id: ChatId) {
        self.sessions.remove(&chat_id);
    }

    pub fn cache_transcript(&self, video_id: &VideoId, fetched: &FetchedTranscript) {
        self.cache_transcript_at(video_id, fetched, Utc::now());
    }

    pub fn cache_transcript_at(
        &self,
        video_id: &VideoId,
        fetched: &FetchedTranscript,
        now: DateTime<Utc>,
    ) {
        let entry = CachedTranscript {
            video_id: video_id.clone(),
            transcript: fetched.transcript.clone(),
            video_title: fetched.video_title.clone(),
            cached_at: now,
        };
        self.transcripts.insert_at(video_id.clone(), entry, now);
        info!("Transcript cached for: {}", video_id);
    }

    pub fn get_cached_transcript(&self, video_id: &VideoId) -> Option<CachedTranscript> {
        self.get_cached_transcript_at(video_id, Utc::now())
    }

    pub fn get_cached_transcript_at(
        &self,
        video_id: &VideoId,
        now: DateTime<Utc>,
    ) -> Option<CachedTranscript> {
        self.transcripts.get_at(video_id, now)
    }

    /// Remember the chat's language and apply it to the live session, if any.
    pub fn set_language(&self, chat_id: ChatId, language: &str) {
        self.languages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(chat_id, language.to_string());
        self.update_session(chat_id, |s| s.language = language.to_string());
    }

    pub fn get_language(&self, chat_id: ChatId) -> String {
        self.languages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&chat_id)
            .cloned()
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string())
    }

    /// Evict every expired session and cached transcript.
    pub fn sweep(&self) -> SweepStats {
        self.sweep_at(Utc::now())
    }

    pub fn sweep_at(&self, now: DateTime<Utc>) -> SweepStats {
        let stats = SweepStats {
            sessions: self.sessions.evict_expired_at(now),
            transcripts: self.transcripts.evict_expired_at(now),
        };
        debug!(
            "Swept {} sessions and {} transcripts",
            stats.sessions, stats.transcripts
        );
        stats
    }

    /// Stored session count, including expired entries not yet swept.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Stored transcript count, including expired entries not yet swept.
    pub fn transcript_count(&self) -> usize {
        self.transcripts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video() -> VideoId {
        VideoId::from_url("https://youtu.be/dQw4w9WgXcQ").unwrap()
    }

    fn fetched() -> FetchedTranscript {
        FetchedTranscript {
            transcript: "[0:01] hello there".to_string(),
            video_title: "Greeting".to_string(),
        }
    }

    fn store() -> SessionStore {
        SessionStore::new(&CacheSettings::default())
    }

    #[test]
    fn test_session_round_trip() {
        let store = store();
        store.set_session(ChatSession::new(7, video(), fetched(), "en"));

        let session = store.get_session(7).unwrap();
        assert_eq!(session.video_title, "Greeting");
        assert_eq!(session.summary, None);
        assert!(store.get_session(8).is_none());
    }

    #[test]
    fn test_session_expires_after_two_hours() {
        let store = store();
        let session = ChatSession::new(7, video(), fetched(), "en");
        let t = session.created_at;
        store.set_session(session);

        assert!(store.get_session_at(7, t + Duration::hours(2)).is_some());
        assert!(store
            .get_session_at(7, t + Duration::hours(2) + Duration::seconds(1))
            .is_none());
        assert_eq!(store.session_count(), 0);
    }

    #[test]
    fn test_update_and_clear_session() {
        let store = store();
        assert!(!store.update_session(7, |s| s.summary = Some("nope".to_string())));

        store.set_session(ChatSession::new(7, video(), fetched(), "en"));
        assert!(store.update_session(7, |s| s.summary = Some("A summary".to_string())));
        assert_eq!(store.get_session(7).unwrap().summary.as_deref(), Some("A summary"));

        store.clear_session(7);
        assert!(store.get_session(7).is_none());
    }

    #[test]
    fn test_transcript_cache_expires_after_a_day() {
        let store = store();
        let t = Utc::now();
        store.cache_transcript_at(&video(), &fetched(), t);

        let cached = store.get_cached_transcript_at(&video(), t + Duration::hours(23)).unwrap();
        assert_eq!(cached.cached_at, t);
        assert_eq!(FetchedTranscript::from(cached), fetched());

        assert!(store
            .get_cached_transcript_at(&video(), t + Duration::hours(24) + Duration::seconds(1))
            .is_none());
        assert_eq!(store.transcript_count(), 0);
    }

    #[test]
    fn test_language_defaults_and_survives_clear() {
        let store = store();
        assert_eq!(store.get_language(1), "en");

        store.set_session(ChatSession::new(1, video(), fetched(), "en"));
        store.set_language(1, "hi");
        assert_eq!(store.get_session(1).unwrap().language, "hi");

        store.clear_session(1);
        assert_eq!(store.get_language(1), "hi");
        assert_eq!(store.get_language(2), "en");
    }

    #[test]
    fn test_sweep_removes_only_expired() {
        let store = store();
        let t = Utc::now();

        let mut old = ChatSession::new(1, video(), fetched(), "en");
        old.created_at = t - Duration::hours(3);
        store.set_session(old);
        store.set_session(ChatSession::new(2, video(), fetched(), "en"));
        store.cache_transcript_at(&video(), &fetched(), t - Duration::hours(25));

        let stats = store.sweep_at(t);
        assert_eq!(stats, SweepStats { sessions: 1, transcripts: 1 });
        assert_eq!(store.session_count(), 1);
        assert!(store.get_session(2).is_some());
    }

    #[test]
    fn test_session_holds_its_own_copy() {
        let store = store();
        let t = Utc::now();
        store.cache_transcript_at(&video(), &fetched(), t);
        let cached = store.get_cached_transcript(&video()).unwrap();
        store.set_session(ChatSession::new(3, video(), cached.into(), "en"));

        assert!(store
            .get_cached_transcript_at(&video(), t + Duration::hours(25))
            .is_none());
        assert_eq!(store.transcript_count(), 0);
        assert_eq!(store.get_session(3).unwrap().transcript, "[0:01] hello there");
    }
}
