//! OpenAI client configuration with sensible defaults.

use crate::error::{AutocastError, Result};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for OpenAI API requests (5 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// OpenAI client type used throughout the crate.
pub type OpenAIClient = Client<OpenAIConfig>;

/// Create an OpenAI client with configured timeout.
///
/// Long scripts make for slow research and speech calls, so the timeout is
/// generous.
pub fn create_client() -> Result<OpenAIClient> {
    create_client_with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
}

/// Create an OpenAI client with a custom timeout.
pub fn create_client_with_timeout(timeout: Duration) -> Result<OpenAIClient> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| AutocastError::Config(format!("Failed to create HTTP client: {}", e)))?;

    Ok(Client::with_config(OpenAIConfig::default()).with_http_client(http_client))
}

/// Check if the OpenAI API key is configured.
pub fn is_api_key_configured() -> bool {
    std::env::var("OPENAI_API_KEY").is_ok_and(|k| !k.is_empty())
}
