//! tldw - YouTube summaries and Q&A over chat
//!
//! Send the bot a YouTube link and it pulls the video's captions with yt-dlp,
//! turns them into a timestamped transcript and replies with an AI summary.
//! Follow-up questions are answered from the part of the transcript that
//! best matches them.
//!
//! # Architecture
//!
//! - `caption_source` - Video ids and caption retrieval via yt-dlp
//! - `transcript` - WebVTT parsing and transcript acquisition
//! - `chunking` - Line chunking, relevance selection and truncation
//! - `store` - Expiring sessions and transcript cache with a background sweep
//! - `llm` - Chat completions client
//! - `assistant` - Summary, answer and analysis prompts
//! - `bot` - Transport-agnostic message dispatch
//! - `telegram` - Telegram Bot API transport
//! - `orchestrator` - Component wiring
//!
//! # Example
//!
//! ```rust,no_run
//! use tldw::caption_source::VideoId;
//! use tldw::config::Settings;
//! use tldw::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let orchestrator = Orchestrator::new(Settings::load()?)?;
//!
//!     let video = VideoId::from_url("https://youtu.be/dQw4w9WgXcQ")?;
//!     let fetched = orchestrator.transcript_service().fetch(&video).await?;
//!     let summary = orchestrator
//!         .assistant()
//!         .summarize(&fetched.transcript, &fetched.video_title, "en")
//!         .await?;
//!     println!("{}", summary);
//!
//!     Ok(())
//! }
//! ```

pub mod assistant;
pub mod bot;
pub mod caption_source;
pub mod chunking;
pub mod cli;
pub mod config;
pub mod error;
pub mod language;
pub mod llm;
pub mod orchestrator;
pub mod store;
pub mod telegram;
pub mod transcript;

pub use error::{Result, TldwError};
