//! WebVTT caption parsing.
//!
//! Turns a raw cue-based subtitle document into the canonical transcript form:
//! one `[m:ss] text` line per cue, with repeated cue text removed.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static START_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+):(\d+):(\d+\.\d+)|(\d+):(\d+\.\d+)").expect("Invalid regex")
});

static INLINE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("Invalid regex"));

/// A single caption cue reduced to its start time and plain text.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionLine {
    /// Start time in seconds.
    pub start_seconds: f64,
    /// Cue text with markup removed and lines joined by a space.
    pub text: String,
}

impl CaptionLine {
    /// Display timestamp as `m:ss` (minutes are not wrapped into hours).
    pub fn timestamp(&self) -> String {
        let minutes = (self.start_seconds / 60.0).floor() as u64;
        let seconds = (self.start_seconds % 60.0).floor() as u64;
        format!("{}:{:02}", minutes, seconds)
    }
}

impl std::fmt::Display for CaptionLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.timestamp(), self.text)
    }
}

/// Parse a caption document into a deduplicated, newline-joined transcript.
///
/// Never fails: blocks without a timing line or a recognizable start time are
/// skipped. Callers decide whether the result is long enough to be useful.
pub fn parse_vtt(content: &str) -> String {
    dedup_lines(parse_cues(content))
        .iter()
        .map(|line| line.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse every usable cue in document order, without deduplication.
pub fn parse_cues(content: &str) -> Vec<CaptionLine> {
    let normalized = content.replace("\r\n", "\n");
    let mut lines = Vec::new();

    for block in normalized.split("\n\n") {
        let block_lines: Vec<&str> = block.trim().split('\n').collect();

        let Some(time_index) = block_lines.iter().position(|l| l.contains("-->")) else {
            continue;
        };

        let Some(start_seconds) = parse_start_time(block_lines[time_index]) else {
            continue;
        };

        let text = block_lines[time_index + 1..]
            .iter()
            .map(|l| clean_text(l))
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if !text.is_empty() {
            lines.push(CaptionLine {
                start_seconds,
                text,
            });
        }
    }

    lines
}

/// Drop every line whose text was already seen earlier in the sequence.
///
/// Rolling auto-captions repeat the same text with advancing timestamps;
/// the first occurrence wins.
pub fn dedup_lines(lines: Vec<CaptionLine>) -> Vec<CaptionLine> {
    let mut seen = HashSet::new();
    lines
        .into_iter()
        .filter(|line| seen.insert(line.text.clone()))
        .collect()
}

/// Extract the cue start time in seconds from a `start --> end` line.
///
/// Accepts `H:MM:SS.fff` and `M:SS.fff`.
fn parse_start_time(timing_line: &str) -> Option<f64> {
    let caps = START_TIME.captures(timing_line)?;

    if let (Some(h), Some(m), Some(s)) = (caps.get(1), caps.get(2), caps.get(3)) {
        let hours: f64 = h.as_str().parse().ok()?;
        let minutes: f64 = m.as_str().parse().ok()?;
        let seconds: f64 = s.as_str().parse().ok()?;
        return Some(hours * 3600.0 + minutes * 60.0 + seconds);
    }

    let minutes: f64 = caps.get(4)?.as_str().parse().ok()?;
    let seconds: f64 = caps.get(5)?.as_str().parse().ok()?;
    Some(minutes * 60.0 + seconds)
}

/// Strip inline tags, decode the basic HTML entities and trim.
fn clean_text(line: &str) -> String {
    INLINE_TAG
        .replace_all(line, "")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .trim()
        .to_string()
}
