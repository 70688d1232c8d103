//! In-memory bot state with time-based expiry.

mod session;
mod sweeper;
mod timed;

pub use session::{CachedTranscript, ChatId, ChatSession, SessionStore, SweepStats};
pub use sweeper::Sweeper;
pub use timed::TimedCache;
