//! LLM provider factory.
//!
//! Creates the completion client named by configuration. Clients are built
//! once at startup and shared for the lifetime of the process.

use crate::client::LlmClient;
use crate::providers::{GroqClient, OllamaClient};
use agrodoc_core::{AppError, AppResult};
use std::sync::Arc;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("groq", "ollama")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - Optional API key; Groq reports its absence on first use
///
/// # Errors
/// Returns `AppError::Config` if the provider is unknown.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn LlmClient>> {
    match provider.to_lowercase().as_str() {
        "groq" => {
            let api_key = api_key.map(str::to_string);
            let client = match endpoint {
                Some(url) => GroqClient::with_base_url(url, api_key),
                None => GroqClient::new(api_key),
            };
            Ok(Arc::new(client))
        }
        "ollama" => {
            let client = match endpoint {
                Some(url) => OllamaClient::with_base_url(url),
                None => OllamaClient::new(),
            };
            Ok(Arc::new(client))
        }
        _ => Err(AppError::Config(format!("Unknown LLM provider: {}", provider))),
    }
}
