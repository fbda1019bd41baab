//! OpenAI client configuration with sensible defaults.

use crate::config::OpenAiSettings;
use crate::error::{CallBriefError, Result};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for OpenAI API requests (5 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Create an OpenAI client for an explicit API key and settings.
pub fn create_client(api_key: &str, settings: &OpenAiSettings) -> Result<Client<OpenAIConfig>> {
    let timeout = match settings.timeout_seconds {
        0 => DEFAULT_TIMEOUT_SECS,
        secs => secs,
    };
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout))
        .build()
        .map_err(|e| CallBriefError::Config(format!("Failed to create HTTP client: {}", e)))?;

    let mut config = OpenAIConfig::new().with_api_key(api_key);
    if let Some(base) = &settings.base_url {
        config = config.with_api_base(base);
    }

    Ok(Client::with_config(config).with_http_client(http_client))
}
