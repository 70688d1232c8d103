//! Pre-flight checks before starting the bot.
//!
//! Validates that required tools and configuration are available
//! before starting operations that would otherwise fail midway.

use crate::config::Settings;
use crate::error::{AcquisitionError, Result, TldwError};
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// The Telegram bot needs a token, an LLM key and yt-dlp.
    Run,
    /// The terminal chat needs an LLM key and yt-dlp.
    Chat,
    /// Fetching a transcript only needs yt-dlp.
    Transcript,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Run => {
            check_telegram_token(settings)?;
            check_api_key(settings)?;
            check_tool(&settings.acquisition.ytdlp_path)?;
        }
        Operation::Chat => {
            check_api_key(settings)?;
            check_tool(&settings.acquisition.ytdlp_path)?;
        }
        Operation::Transcript => {
            check_tool(&settings.acquisition.ytdlp_path)?;
        }
    }
    Ok(())
}

fn check_telegram_token(settings: &Settings) -> Result<()> {
    match settings.telegram_token() {
        Some(_) => Ok(()),
        None => Err(TldwError::Config(
            "TELEGRAM_BOT_TOKEN not set. Set it with: export TELEGRAM_BOT_TOKEN='123456:ABC...' \
             or telegram.bot_token in the config file"
                .to_string(),
        )),
    }
}

fn check_api_key(settings: &Settings) -> Result<()> {
    let name = &settings.llm.api_key_env;
    match settings.llm_api_key() {
        Some(_) => Ok(()),
        None => Err(TldwError::Config(format!(
            "{} not set. Set it with: export {}='sk-...'",
            name, name
        ))),
    }
}

/// Check if an external tool is available.
fn check_tool(program: &str) -> Result<()> {
    match Command::new(program).arg("--version").output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(AcquisitionError::ToolFailed(format!(
            "{} is installed but not working correctly",
            program
        ))
        .into()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(AcquisitionError::ToolNotFound(program.to_string()).into())
        }
        Err(e) => Err(AcquisitionError::ToolFailed(format!("{}: {}", program, e)).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_without_tool() -> Settings {
        let mut settings = Settings::default();
        settings.acquisition.ytdlp_path = "/nonexistent/yt-dlp-for-tests".to_string();
        settings
    }

    #[test]
    fn test_missing_tool_reported() {
        let err = check(Operation::Transcript, &settings_without_tool()).unwrap_err();
        assert!(matches!(
            err,
            TldwError::Acquisition(AcquisitionError::ToolNotFound(_))
        ));
    }

    #[test]
    fn test_missing_api_key_reported_first() {
        let mut settings = settings_without_tool();
        settings.llm.api_key_env = "TLDW_TEST_KEY_THAT_IS_NEVER_SET".to_string();

        let err = check(Operation::Chat, &settings).unwrap_err();
        assert!(err.to_string().contains("TLDW_TEST_KEY_THAT_IS_NEVER_SET not set"));
    }
}
