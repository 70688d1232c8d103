//! Error types for tldw.

use thiserror::Error;

/// Library-level error type for tldw operations.
#[derive(Error, Debug)]
pub enum TldwError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Could not get transcript: {0}\n\nMake sure the video has CC/subtitles.")]
    Acquisition(#[from] AcquisitionError),

    #[error("AI error: {0}")]
    Generation(String),

    #[error("Chat transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Why a transcript could not be obtained for a video.
///
/// Every variant is surfaced to the user through [`TldwError::Acquisition`],
/// which adds the hint about caption availability.
#[derive(Error, Debug)]
pub enum AcquisitionError {
    #[error("{0} not found. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("yt-dlp failed: {0}")]
    ToolFailed(String),

    #[error("yt-dlp timed out after {0} seconds")]
    Timeout(u64),

    #[error("yt-dlp output exceeded {0} bytes")]
    OutputTooLarge(usize),

    #[error("Malformed video info: {0}")]
    MalformedInfo(String),

    #[error("No subtitle URL found in video info")]
    NoCaptionTrack,

    #[error("Failed to fetch subtitles: {0}")]
    CaptionFetch(String),

    #[error("Parsed transcript is too short or empty")]
    TranscriptTooShort,
}

/// Result type alias for tldw operations.
pub type Result<T> = std::result::Result<T, TldwError>;
