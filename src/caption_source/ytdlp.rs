//! yt-dlp backed caption source.

use super::{CaptionSource, RawCaptions, VideoId, DEFAULT_VIDEO_TITLE};
use crate::config::AcquisitionSettings;
use crate::error::{AcquisitionError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

/// Video metadata fields read from `yt-dlp --dump-json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoInfo {
    #[serde(default)]
    pub fulltitle: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub requested_subtitles: Option<HashMap<String, Option<CaptionFormat>>>,
    /// Language code to list of formats, in document order.
    #[serde(default)]
    pub automatic_captions: Option<serde_json::Map<String, serde_json::Value>>,
}

impl VideoInfo {
    /// Parse the first non-empty line of yt-dlp output.
    pub fn from_output(stdout: &str) -> std::result::Result<Self, AcquisitionError> {
        let line = stdout
            .lines()
            .find(|l| !l.trim().is_empty())
            .ok_or_else(|| AcquisitionError::MalformedInfo("yt-dlp printed nothing".to_string()))?;

        serde_json::from_str(line).map_err(|e| AcquisitionError::MalformedInfo(e.to_string()))
    }

    pub fn display_title(&self) -> String {
        self.fulltitle
            .as_deref()
            .filter(|t| !t.is_empty())
            .or_else(|| self.title.as_deref().filter(|t| !t.is_empty()))
            .unwrap_or(DEFAULT_VIDEO_TITLE)
            .to_string()
    }
}

/// One downloadable rendition of a caption track.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaptionFormat {
    #[serde(default)]
    pub ext: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Pick the caption URL to download.
///
/// Explicitly requested English subtitles win. Otherwise the first automatic
/// track whose language starts with `en`, else the first track at all; within
/// that track the `vtt` rendition, else the first one.
pub fn select_caption_url(info: &VideoInfo) -> Option<String> {
    let requested = info
        .requested_subtitles
        .as_ref()
        .and_then(|subs| subs.get("en"))
        .and_then(|track| track.as_ref())
        .and_then(|track| track.url.clone())
        .filter(|url| !url.is_empty());

    if let Some(url) = requested {
        info!("Found English subtitle URL");
        return Some(url);
    }

    let captions = info.automatic_captions.as_ref()?;
    let lang = captions
        .keys()
        .find(|l| l.starts_with("en"))
        .or_else(|| captions.keys().next())?;

    let formats: Vec<CaptionFormat> = match serde_json::from_value(captions[lang].clone()) {
        Ok(formats) => formats,
        Err(e) => {
            warn!("Ignoring malformed caption list for {}: {}", lang, e);
            return None;
        }
    };

    let chosen = formats
        .iter()
        .find(|f| f.ext.as_deref() == Some("vtt"))
        .or_else(|| formats.first())?;

    let url = chosen.url.clone().filter(|url| !url.is_empty())?;
    info!("Found auto-caption URL for lang: {}", lang);
    Some(url)
}

/// Caption source that asks yt-dlp for video metadata and then downloads
/// the chosen caption track over HTTP.
pub struct YtDlpSource {
    program: String,
    timeout: Duration,
    max_output_bytes: usize,
    http: reqwest::Client,
}

impl YtDlpSource {
    pub fn new(settings: &AcquisitionSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            program: settings.ytdlp_path.clone(),
            timeout: Duration::from_secs(settings.timeout_secs),
            max_output_bytes: settings.max_output_bytes,
            http,
        })
    }

    /// Run yt-dlp for the video and parse its metadata line.
    #[instrument(skip(self), fields(video_id = %video))]
    pub async fn probe(&self, video: &VideoId) -> std::result::Result<VideoInfo, AcquisitionError> {
        let url = video.watch_url();
        let stdout = self.run_ytdlp(&url).await?;
        VideoInfo::from_output(&String::from_utf8_lossy(&stdout))
    }

    /// Resolve and download captions for already-probed metadata.
    ///
    /// Fails with [`AcquisitionError::NoCaptionTrack`] without touching the
    /// network when no caption URL can be resolved.
    pub async fn captions_for(
        &self,
        info: &VideoInfo,
    ) -> std::result::Result<RawCaptions, AcquisitionError> {
        let caption_url = select_caption_url(info).ok_or(AcquisitionError::NoCaptionTrack)?;
        let content = self.download(&caption_url).await?;
        info!("Subtitle content fetched: {} chars", content.chars().count());

        Ok(RawCaptions {
            content,
            video_title: info.display_title(),
        })
    }

    async fn download(&self, caption_url: &str) -> std::result::Result<String, AcquisitionError> {
        let parsed = url::Url::parse(caption_url)
            .map_err(|e| AcquisitionError::CaptionFetch(format!("invalid URL: {}", e)))?;

        let response = self
            .http
            .get(parsed)
            .send()
            .await
            .map_err(|e| AcquisitionError::CaptionFetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AcquisitionError::CaptionFetch(status.to_string()));
        }

        response
            .text()
            .await
            .map_err(|e| AcquisitionError::CaptionFetch(e.to_string()))
    }

    /// Run yt-dlp with a hard timeout and a cap on captured stdout.
    async fn run_ytdlp(&self, url: &str) -> std::result::Result<Vec<u8>, AcquisitionError> {
        debug!("Running {} for {}", self.program, url);

        let mut child = Command::new(&self.program)
            .args([
                "--write-auto-sub",
                "--sub-lang",
                "en",
                "--skip-download",
                "--dump-json",
                "--no-warnings",
                url,
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    AcquisitionError::ToolNotFound(self.program.clone())
                } else {
                    AcquisitionError::ToolFailed(format!("execution failed: {}", e))
                }
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| AcquisitionError::ToolFailed("stdout not captured".to_string()))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| AcquisitionError::ToolFailed("stderr not captured".to_string()))?;

        let limit = self.max_output_bytes;

        // The child is owned by this future; dropping it on timeout kills it.
        let run = async move {
            // Keep at most `limit` bytes of stderr but drain the rest so the
            // child never blocks on a full pipe.
            let stderr_task = tokio::spawn(async move {
                let mut buf = Vec::new();
                let _ = (&mut stderr).take(limit as u64).read_to_end(&mut buf).await;
                let _ = tokio::io::copy(&mut stderr, &mut tokio::io::sink()).await;
                String::from_utf8_lossy(&buf).into_owned()
            });

            let captured = read_capped(stdout, limit)
                .await
                .map_err(|e| AcquisitionError::ToolFailed(e.to_string()))?;

            let Some(output) = captured else {
                let _ = child.kill().await;
                stderr_task.abort();
                return Err(AcquisitionError::OutputTooLarge(limit));
            };

            let status = child
                .wait()
                .await
                .map_err(|e| AcquisitionError::ToolFailed(e.to_string()))?;
            let stderr_text = stderr_task.await.unwrap_or_default();

            if !status.success() {
                return Err(AcquisitionError::ToolFailed(stderr_text.trim().to_string()));
            }

            Ok(output)
        };

        match tokio::time::timeout(self.timeout, run).await {
            Ok(result) => result,
            Err(_) => Err(AcquisitionError::Timeout(self.timeout.as_secs())),
        }
    }
}

/// Read to EOF, or return `None` as soon as more than `limit` bytes arrive.
async fn read_capped<R>(reader: R, limit: usize) -> std::io::Result<Option<Vec<u8>>>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    reader.take(limit as u64 + 1).read_to_end(&mut buf).await?;
    if buf.len() > limit {
        Ok(None)
    } else {
        Ok(Some(buf))
    }
}

#[async_trait]
impl CaptionSource for YtDlpSource {
    async fn resolve(&self, video: &VideoId) -> Result<RawCaptions> {
        let info = self.probe(video).await?;
        Ok(self.captions_for(&info).await?)
    }
}
