//! Chat completions client configuration.

use crate::config::LlmSettings;
use crate::error::{Result, TldwError};
use async_openai::{config::OpenAIConfig, Client};
use reqwest::header::{HeaderMap, HeaderValue};
use std::time::Duration;

/// Attribution headers OpenRouter uses to identify the calling app.
pub const OPENROUTER_REFERER: &str = "https://github.com/tldw-bot";
pub const OPENROUTER_TITLE: &str = "TLDW Bot";

/// Create a client for the configured endpoint.
///
/// The underlying HTTP client carries the request timeout and the
/// attribution headers.
pub fn create_client(settings: &LlmSettings, api_key: &str) -> Result<Client<OpenAIConfig>> {
    let mut headers = HeaderMap::new();
    headers.insert("HTTP-Referer", HeaderValue::from_static(OPENROUTER_REFERER));
    headers.insert("X-Title", HeaderValue::from_static(OPENROUTER_TITLE));

    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.request_timeout_secs))
        .default_headers(headers)
        .build()
        .map_err(|e| TldwError::Config(format!("Failed to create HTTP client: {}", e)))?;

    let config = OpenAIConfig::new()
        .with_api_base(settings.api_base.trim_end_matches('/'))
        .with_api_key(api_key);

    Ok(Client::with_config(config).with_http_client(http_client))
}
