//! YouTube link parsing.

use crate::error::{Result, TldwError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

// Matches watch, embed, shorts, live and youtu.be links with an optional
// scheme and www./m. prefix.
static YOUTUBE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        (?:https?://)?
        (?:www\.|m\.)?
        (?:
            youtube\.com/(?:watch\?(?:.*&)?v=|embed/|shorts/|live/)
            |
            youtu\.be/
        )
        ([a-zA-Z0-9_-]{11})
    ",
    )
    .expect("Invalid regex")
});

/// An 11-character YouTube video identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    /// Extract a video id from a YouTube link embedded anywhere in `text`.
    pub fn from_url(text: &str) -> Result<Self> {
        extract_video_id(text).ok_or_else(|| {
            TldwError::InvalidInput(format!("Could not read a YouTube link from: {}", text))
        })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical watch URL for this video.
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.0)
    }
}

impl std::fmt::Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Check whether the text contains a YouTube video link.
pub fn is_youtube_url(text: &str) -> bool {
    YOUTUBE_URL.is_match(text)
}

/// Extract the video id from the first YouTube link in the text.
pub fn extract_video_id(text: &str) -> Option<VideoId> {
    YOUTUBE_URL
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| VideoId(m.as_str().to_string()))
}
