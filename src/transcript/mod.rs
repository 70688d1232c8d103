//! Transcript module for tldw.
//!
//! Parses caption documents into the canonical `[m:ss] text` transcript and
//! drives acquisition from a [`crate::caption_source::CaptionSource`].

mod service;
mod vtt;

pub use service::{FetchedTranscript, TranscriptService};
pub use vtt::{dedup_lines, parse_cues, parse_vtt, CaptionLine};
