//! CLI module for tldw.

pub mod commands;
mod output;
pub mod preflight;

pub use output::{preview, Output};

use clap::{Parser, Subcommand};

/// tldw - YouTube summaries and Q&A in your chat
///
/// Paste a YouTube link, get a structured summary of its captions, then ask
/// follow-up questions answered from the transcript.
#[derive(Parser, Debug)]
#[command(name = "tldw")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "TLDW_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the Telegram bot
    Run,

    /// Talk to the bot in the terminal
    Chat,

    /// Fetch and print the transcript of a YouTube video
    Transcript {
        /// YouTube URL
        url: String,

        /// Split the transcript into chunks of at most this many characters
        #[arg(long)]
        chunks: Option<usize>,

        /// Print the chunk that best matches this question (requires --chunks)
        #[arg(short, long, requires = "chunks")]
        query: Option<String>,
    },

    /// Check system requirements and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Write the current configuration to the config file
    Init,

    /// Show configuration file path
    Path,
}
