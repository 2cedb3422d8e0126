//! Answer generation with cache fallback.

use crate::cache::AnswerCache;
use crate::prompt::PromptBuilder;
use crate::types::ContextItem;
use agrodoc_core::AppResult;
use agrodoc_llm::{LlmClient, LlmRequest};
use std::sync::Arc;

/// Output budget for a generated answer.
pub const MAX_ANSWER_TOKENS: u32 = 500;

/// Returned when generation fails and nothing is cached.
pub const FALLBACK_ANSWER: &str = "Sorry, I couldn't generate an answer. Please try again.";

/// Generates answers from the completion service.
///
/// Successful answers are written to the shared [`AnswerCache`]; on a
/// completion failure the last cached answer for the same query (or
/// [`FALLBACK_ANSWER`]) is returned instead.
pub struct AnswerGenerator {
    client: Arc<dyn LlmClient>,
    model: String,
    prompt: PromptBuilder,
    cache: AnswerCache,
}

impl AnswerGenerator {
    pub fn new(
        client: Arc<dyn LlmClient>,
        model: impl Into<String>,
        cache: AnswerCache,
    ) -> AppResult<Self> {
        Ok(Self {
            client,
            model: model.into(),
            prompt: PromptBuilder::new()?,
            cache,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate an answer for `query` grounded on `context`.
    ///
    /// Only a prompt rendering failure is returned as an error.
    pub async fn generate(&self, query: &str, context: &[ContextItem]) -> AppResult<String> {
        let prompt = self.prompt.render(query, context)?;
        let request = LlmRequest::new(prompt, &self.model).with_max_tokens(MAX_ANSWER_TOKENS);

        match self.client.complete(&request).await {
            Ok(response) => {
                tracing::debug!(
                    provider = self.client.provider_name(),
                    tokens = response.usage.total_tokens,
                    "Generated answer"
                );
                self.cache.put(query, response.content.clone());
                Ok(response.content)
            }
            Err(e) => {
                tracing::error!("Error generating answer: {}", e);
                Ok(self
                    .cache
                    .get(query)
                    .unwrap_or_else(|| FALLBACK_ANSWER.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agrodoc_core::AppError;
    use agrodoc_llm::{LlmResponse, LlmUsage};
    use std::sync::Mutex;

    /// Completion double that records prompts and replays scripted results.
    struct ScriptedClient {
        reply: Option<String>,
        seen: Mutex<Vec<LlmRequest>>,
    }

    impl ScriptedClient {
        fn ok(reply: &str) -> Self {
            Self {
                reply: Some(reply.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn down() -> Self {
            Self {
                reply: None,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl LlmClient for ScriptedClient {
        fn provider_name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
            self.seen.lock().unwrap().push(request.clone());
            match &self.reply {
                Some(content) => Ok(LlmResponse {
                    content: content.clone(),
                    model: request.model.clone(),
                    usage: LlmUsage::default(),
                }),
                None => Err(AppError::Llm("service unavailable".to_string())),
            }
        }
    }

    #[tokio::test]
    async fn test_success_caches_answer() {
        let client = Arc::new(ScriptedClient::ok("Use certified seed."));
        let cache = AnswerCache::new(16, None);
        let generator = AnswerGenerator::new(client.clone(), "llama3-8b-8192", cache.clone()).unwrap();

        let context = vec![ContextItem::from_source("Seed quality matters.", "seeds.txt")];
        let answer = generator.generate("Which seed?", &context).await.unwrap();

        assert_eq!(answer, "Use certified seed.");
        assert_eq!(cache.get("Which seed?").as_deref(), Some("Use certified seed."));

        let seen = client.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].max_tokens, Some(500));
        assert_eq!(seen[0].model, "llama3-8b-8192");
        assert!(seen[0].prompt.contains("Context: Seed quality matters."));
    }

    #[tokio::test]
    async fn test_failure_returns_cached_answer() {
        let cache = AnswerCache::new(16, None);
        cache.put("X?", "X");
        let generator = AnswerGenerator::new(Arc::new(ScriptedClient::down()), "m", cache).unwrap();

        let answer = generator.generate("X?", &[]).await.unwrap();
        assert_eq!(answer, "X");
    }

    #[tokio::test]
    async fn test_failure_without_cache_returns_fallback() {
        let cache = AnswerCache::new(16, None);
        let generator =
            AnswerGenerator::new(Arc::new(ScriptedClient::down()), "m", cache.clone()).unwrap();

        let answer = generator.generate("Unseen?", &[]).await.unwrap();
        assert_eq!(answer, FALLBACK_ANSWER);
        assert_eq!(cache.get("Unseen?"), None);
    }
}
