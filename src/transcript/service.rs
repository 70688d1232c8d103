//! Transcript acquisition: caption source, parsing and validation.

use super::vtt::parse_vtt;
use crate::caption_source::{CaptionSource, VideoId};
use crate::error::{AcquisitionError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};

/// A parsed transcript ready for caching and prompting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchedTranscript {
    /// Newline-joined `[m:ss] text` lines.
    pub transcript: String,
    pub video_title: String,
}

/// Obtains usable transcripts for videos.
pub struct TranscriptService {
    source: Arc<dyn CaptionSource>,
    min_chars: usize,
}

impl TranscriptService {
    pub fn new(source: Arc<dyn CaptionSource>, min_chars: usize) -> Self {
        Self { source, min_chars }
    }

    /// Fetch, parse and validate the transcript for a video.
    ///
    /// Every failure comes back as [`crate::TldwError::Acquisition`].
    #[instrument(skip(self), fields(video_id = %video))]
    pub async fn fetch(&self, video: &VideoId) -> Result<FetchedTranscript> {
        info!("Fetching transcript for: {}", video);

        let result = self.fetch_inner(video).await;
        if let Err(e) = &result {
            error!("Transcript fetch failed: {}", e);
        }
        result
    }

    async fn fetch_inner(&self, video: &VideoId) -> Result<FetchedTranscript> {
        let raw = self.source.resolve(video).await?;
        let transcript = parse_vtt(&raw.content);

        if transcript.chars().count() < self.min_chars {
            return Err(AcquisitionError::TranscriptTooShort.into());
        }

        info!("Transcript ready: {} chars", transcript.chars().count());
        Ok(FetchedTranscript {
            transcript,
            video_title: raw.video_title,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caption_source::RawCaptions;
    use crate::error::TldwError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CannedSource {
        content: String,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CaptionSource for CannedSource {
        async fn resolve(&self, _video: &VideoId) -> Result<RawCaptions> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(RawCaptions {
                content: self.content.clone(),
                video_title: "Canned".to_string(),
            })
        }
    }

    struct NoCaptions;

    #[async_trait]
    impl CaptionSource for NoCaptions {
        async fn resolve(&self, _video: &VideoId) -> Result<RawCaptions> {
            Err(AcquisitionError::NoCaptionTrack.into())
        }
    }

    fn video() -> VideoId {
        VideoId::from_url("https://youtu.be/dQw4w9WgXcQ").unwrap()
    }

    #[tokio::test]
    async fn test_fetch_parses_captions() {
        let source = Arc::new(CannedSource {
            content: "WEBVTT\n\n00:00:01.000 --> 00:00:04.000\nWelcome to a long enough caption line\n\n\
                      00:00:04.000 --> 00:00:08.000\nthat keeps going past the minimum length"
                .to_string(),
            calls: AtomicUsize::new(0),
        });
        let service = TranscriptService::new(source.clone(), 50);

        let fetched = service.fetch(&video()).await.unwrap();
        assert_eq!(fetched.video_title, "Canned");
        assert_eq!(
            fetched.transcript,
            "[0:01] Welcome to a long enough caption line\n[0:04] that keeps going past the minimum length"
        );
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_short_transcript_rejected() {
        let source = Arc::new(CannedSource {
            content: "00:00:01.000 --> 00:00:02.000\nhi".to_string(),
            calls: AtomicUsize::new(0),
        });
        let service = TranscriptService::new(source, 50);

        let err = service.fetch(&video()).await.unwrap_err();
        assert!(matches!(
            err,
            TldwError::Acquisition(AcquisitionError::TranscriptTooShort)
        ));
        let message = err.to_string();
        assert!(message.starts_with("Could not get transcript: Parsed transcript is too short"));
        assert!(message.ends_with("Make sure the video has CC/subtitles."));
    }

    #[tokio::test]
    async fn test_source_failure_carries_hint() {
        let service = TranscriptService::new(Arc::new(NoCaptions), 50);
        let err = service.fetch(&video()).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Could not get transcript: No subtitle URL found in video info\n\nMake sure the video has CC/subtitles."
        );
    }

    fn single_cue(text_chars: usize) -> Arc<CannedSource> {
        Arc::new(CannedSource {
            content: format!("00:00:01.000 --> 00:00:02.000\n{}", "a".repeat(text_chars)),
            calls: AtomicUsize::new(0),
        })
    }

    #[tokio::test]
    async fn test_minimum_length_boundary() {
        // "[0:01] " prefix is 7 characters.
        let below = TranscriptService::new(single_cue(42), 50);
        let err = below.fetch(&video()).await.unwrap_err();
        assert!(matches!(
            err,
            TldwError::Acquisition(AcquisitionError::TranscriptTooShort)
        ));

        let at = TranscriptService::new(single_cue(43), 50);
        let fetched = at.fetch(&video()).await.unwrap();
        assert_eq!(fetched.transcript.chars().count(), 50);
    }
}
