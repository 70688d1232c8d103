//! Caption source abstraction for tldw.
//!
//! A caption source turns a video id into a raw subtitle document plus the
//! video title. The production implementation drives yt-dlp; tests swap in
//! canned sources.

mod youtube;
mod ytdlp;

pub use youtube::{extract_video_id, is_youtube_url, VideoId};
pub use ytdlp::{select_caption_url, CaptionFormat, VideoInfo, YtDlpSource};

use crate::error::Result;
use async_trait::async_trait;

/// Title used when the metadata carries none.
pub const DEFAULT_VIDEO_TITLE: &str = "YouTube Video";

/// Raw caption content as delivered by a source, before parsing.
#[derive(Debug, Clone)]
pub struct RawCaptions {
    /// Cue-based subtitle document (WebVTT or close to it).
    pub content: String,
    /// Human-readable video title.
    pub video_title: String,
}

/// Trait for caption providers.
#[async_trait]
pub trait CaptionSource: Send + Sync {
    /// Obtain the raw captions and title for a video.
    async fn resolve(&self, video: &VideoId) -> Result<RawCaptions>;
}
