//! Groq completion provider.
//!
//! Groq exposes an OpenAI-compatible chat completions API.
//! The API key is optional at construction so that a missing `GROQ_API_KEY`
//! only surfaces when the first completion is attempted.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use agrodoc_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Default Groq endpoint.
pub const DEFAULT_GROQ_URL: &str = "https://api.groq.com/openai/v1";

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    model: String,
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

/// Groq chat completions client.
pub struct GroqClient {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl GroqClient {
    /// Create a client against the public Groq endpoint.
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(DEFAULT_GROQ_URL, api_key)
    }

    /// Create a client against a custom OpenAI-compatible endpoint.
    pub fn with_base_url(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            client: reqwest::Client::new(),
        }
    }

    fn to_chat_request(&self, request: &LlmRequest) -> ChatRequest {
        ChatRequest {
            model: request.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: request.prompt.clone(),
            }],
            max_tokens: request.max_tokens,
        }
    }

    fn convert_response(response: ChatResponse) -> AppResult<LlmResponse> {
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::Llm("Groq response contained no choices".to_string()))?;

        let usage = response
            .usage
            .map(|u| LlmUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        Ok(LlmResponse {
            content,
            model: response.model,
            usage,
        })
    }
}

#[async_trait::async_trait]
impl LlmClient for GroqClient {
    fn provider_name(&self) -> &str {
        "groq"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::Llm("GROQ_API_KEY is not set".to_string()))?;

        tracing::info!("Sending completion request to Groq (model: {})", request.model);

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&self.to_chat_request(request))
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to send request to Groq: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Llm(format!(
                "Groq API error ({}): {}",
                status, error_text
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse Groq response: {}", e)))?;

        let converted = Self::convert_response(chat_response)?;
        tracing::debug!(
            "Groq usage - Prompt: {}, Completion: {}",
            converted.usage.prompt_tokens,
            converted.usage.completion_tokens
        );

        Ok(converted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_sends_prompt_as_user_message() {
        let client = GroqClient::new(Some("key".to_string()));
        let request = LlmRequest::new("How to sow wheat?", "llama3-8b-8192").with_max_tokens(500);

        let chat = client.to_chat_request(&request);
        assert_eq!(chat.messages.len(), 1);
        assert_eq!(chat.messages[0].role, "user");
        assert_eq!(chat.messages[0].content, "How to sow wheat?");
        assert_eq!(chat.max_tokens, Some(500));
    }

    #[test]
    fn test_convert_response_reads_first_choice() {
        let body = serde_json::json!({
            "model": "llama3-8b-8192",
            "choices": [{"message": {"role": "assistant", "content": "Use balanced NPK fertilizer"}}],
            "usage": {"prompt_tokens": 40, "completion_tokens": 6, "total_tokens": 46}
        });
        let response: ChatResponse = serde_json::from_value(body).unwrap();

        let converted = GroqClient::convert_response(response).unwrap();
        assert_eq!(converted.content, "Use balanced NPK fertilizer");
        assert_eq!(converted.usage.total_tokens, 46);
    }

    #[test]
    fn test_convert_response_without_choices_is_error() {
        let body = serde_json::json!({"model": "llama3-8b-8192", "choices": []});
        let response: ChatResponse = serde_json::from_value(body).unwrap();

        assert!(GroqClient::convert_response(response).is_err());
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_on_first_call() {
        let client = GroqClient::new(None);
        let request = LlmRequest::new("hi", "llama3-8b-8192");

        match client.complete(&request).await {
            Err(AppError::Llm(msg)) => assert!(msg.contains("GROQ_API_KEY")),
            other => panic!("Expected missing key error, got {:?}", other.map(|r| r.content)),
        }
    }
}
