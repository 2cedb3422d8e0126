//! End-to-end query pipeline.
//!
//! `Start → CacheCheck → Retrieve → WeatherCheck → Generate → Translate → Done`,
//! with `ErrorExit` reachable from any stage. Each transition is logged with
//! a `stage` field.

use crate::cache::AnswerCache;
use crate::generator::AnswerGenerator;
use crate::retriever::ContextRetriever;
use crate::translate::Translator;
use crate::types::{Answer, ContextItem, Query, QueryRequest, QueryResponse, SourceOutcome};
use crate::weather::WeatherAugmenter;
use agrodoc_core::AppResult;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;

/// Error message returned for any unexpected pipeline failure.
pub const PROCESS_FAILURE: &str = "Failed to process query";

/// Text of the single context item on a cache hit.
pub const CACHED_CONTEXT_TEXT: &str = "Cached answer";

/// Source tag of the single context item on a cache hit.
pub const CACHE_SOURCE: &str = "offline_cache";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    CacheCheck,
    Retrieve,
    WeatherCheck,
    Generate,
    Translate,
    Done,
    ErrorExit,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::CacheCheck => "cache_check",
            Self::Retrieve => "retrieve",
            Self::WeatherCheck => "weather_check",
            Self::Generate => "generate",
            Self::Translate => "translate",
            Self::Done => "done",
            Self::ErrorExit => "error_exit",
        }
    }
}

/// Runs queries through retrieval, weather, generation and translation.
///
/// All collaborators are injected and shared across requests.
pub struct QueryOrchestrator {
    cache: AnswerCache,
    retriever: ContextRetriever,
    weather: WeatherAugmenter,
    generator: AnswerGenerator,
    translator: Translator,
}

impl QueryOrchestrator {
    /// `cache` must be the same store the generator writes to.
    pub fn new(
        cache: AnswerCache,
        retriever: ContextRetriever,
        weather: WeatherAugmenter,
        generator: AnswerGenerator,
        translator: Translator,
    ) -> Self {
        Self {
            cache,
            retriever,
            weather,
            generator,
            translator,
        }
    }

    /// Validate a raw request and process it.
    ///
    /// An empty query is returned as `InvalidInput` without entering the
    /// pipeline; everything after validation resolves to a response.
    pub async fn handle(&self, request: QueryRequest) -> AppResult<QueryResponse> {
        let query = request.into_query()?;
        Ok(self.process(&query).await)
    }

    /// Process a validated query. Never fails and never panics outward.
    pub async fn process(&self, query: &Query) -> QueryResponse {
        match AssertUnwindSafe(self.run(query)).catch_unwind().await {
            Ok(Ok(answer)) => QueryResponse::Answer(answer),
            Ok(Err(e)) => {
                tracing::error!(stage = Stage::ErrorExit.as_str(), "Error processing query: {}", e);
                QueryResponse::error(PROCESS_FAILURE)
            }
            Err(panic) => {
                let detail = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                tracing::error!(
                    stage = Stage::ErrorExit.as_str(),
                    "Pipeline panicked while processing query: {}",
                    detail
                );
                QueryResponse::error(PROCESS_FAILURE)
            }
        }
    }

    async fn run(&self, query: &Query) -> AppResult<Answer> {
        tracing::info!(
            stage = Stage::Start.as_str(),
            target_lang = %query.target_lang,
            has_location = query.location.is_some(),
            "Processing query"
        );

        let location = query.location.as_deref().filter(|l| !l.is_empty());

        tracing::debug!(stage = Stage::CacheCheck.as_str());
        if location.is_none() {
            if let Some(answer) = self.cache.get(&query.text) {
                tracing::info!(stage = Stage::CacheCheck.as_str(), "Serving cached answer");
                let context = vec![ContextItem::from_source(CACHED_CONTEXT_TEXT, CACHE_SOURCE)];
                return Ok(self.finish(answer, &query.target_lang, context).await);
            }
        }

        tracing::debug!(stage = Stage::Retrieve.as_str());
        let mut context = match self.retriever.retrieve(&query.text).await {
            SourceOutcome::Available(items) => items,
            SourceOutcome::Unavailable(reason) => {
                tracing::warn!(
                    stage = Stage::Retrieve.as_str(),
                    "Continuing without retrieved context: {}",
                    reason
                );
                Vec::new()
            }
        };

        if let Some(location) = location {
            tracing::debug!(stage = Stage::WeatherCheck.as_str(), location);
            match self.weather.fetch(location).await {
                SourceOutcome::Available(item) => context.push(item),
                SourceOutcome::Unavailable(reason) => {
                    tracing::warn!(
                        stage = Stage::WeatherCheck.as_str(),
                        "Continuing without weather: {}",
                        reason
                    );
                }
            }
        }

        tracing::debug!(stage = Stage::Generate.as_str(), context_items = context.len());
        let answer = self.generator.generate(&query.text, &context).await?;

        Ok(self.finish(answer, &query.target_lang, context).await)
    }

    async fn finish(&self, answer: String, target_lang: &str, context: Vec<ContextItem>) -> Answer {
        tracing::debug!(stage = Stage::Translate.as_str(), target_lang);
        let translated_answer = self.translator.translate(&answer, target_lang).await;

        tracing::info!(
            stage = Stage::Done.as_str(),
            context_items = context.len(),
            "Query processed"
        );

        Answer {
            answer,
            translated_answer,
            context,
        }
    }
}
