//! Generation-service client factory.
//!
//! This module creates `LlmClient` instances based on application
//! configuration. It handles provider resolution and secret injection.

use crate::client::LlmClient;
use crate::providers::OpenAiClient;
use std::sync::Arc;

/// Default Ollama OpenAI-compatible endpoint.
const OLLAMA_BASE_URL: &str = "http://localhost:11434/v1";

/// Create a generation-service client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("openai", "ollama")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - Optional API key (required for hosted providers)
///
/// # Errors
/// Returns an error if the provider is unknown or a required secret
/// is missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
) -> Result<Arc<dyn LlmClient>, String> {
    match provider.to_lowercase().as_str() {
        "openai" => {
            let Some(key) = api_key else {
                return Err("OpenAI provider requires API key".to_string());
            };
            let client = match endpoint {
                Some(url) => OpenAiClient::with_base_url(url, Some(key.to_string())),
                None => OpenAiClient::new(key),
            };
            Ok(Arc::new(client))
        }
        "ollama" => {
            let base_url = endpoint.unwrap_or(OLLAMA_BASE_URL);
            let client = OpenAiClient::with_base_url(base_url, None);
            Ok(Arc::new(client))
        }
        _ => Err(format!("Unknown provider: {}", provider)),
    }
}
