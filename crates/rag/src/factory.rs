//! Wiring of pipeline collaborators from configuration.

use crate::cache::AnswerCache;
use crate::generator::AnswerGenerator;
use crate::orchestrator::QueryOrchestrator;
use crate::retriever::ContextRetriever;
use crate::translate::Translator;
use crate::weather::{OpenWeatherMapClient, WeatherAugmenter};
use agrodoc_core::{AppConfig, AppResult};
use agrodoc_knowledge::{create_provider, Ingestor, SqliteIndex, VectorIndex};
use agrodoc_llm::create_client;
use std::sync::Arc;

/// Long-lived services shared by every request.
pub struct Services {
    pub orchestrator: Arc<QueryOrchestrator>,
    pub ingestor: Arc<Ingestor>,
    pub index: Arc<dyn VectorIndex>,
}

impl Services {
    /// Build all clients, the index and the cache once.
    ///
    /// No network calls are made here; missing credentials surface on the
    /// first request that needs them.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let index: Arc<dyn VectorIndex> = Arc::new(SqliteIndex::open(&config.index_path)?);
        let embedder = create_provider(&config.embedding)?;
        let llm = create_client(
            &config.llm.provider,
            config.llm.endpoint.as_deref(),
            config.groq_api_key.as_deref(),
        )?;

        let cache = AnswerCache::from_settings(&config.cache);
        let retriever =
            ContextRetriever::new(embedder.clone(), index.clone()).with_top_k(config.top_k);
        let weather = WeatherAugmenter::new(Arc::new(OpenWeatherMapClient::with_base_url(
            config.weather_endpoint.clone(),
            config.weather_api_key.clone(),
        )));
        let generator = AnswerGenerator::new(llm, config.llm.model.clone(), cache.clone())?;

        let orchestrator =
            QueryOrchestrator::new(cache, retriever, weather, generator, Translator::with_defaults());

        tracing::info!(
            llm_provider = %config.llm.provider,
            llm_model = %config.llm.model,
            embedding_provider = %config.embedding.provider,
            index = %config.index_path.display(),
            "Pipeline services ready"
        );

        Ok(Self {
            orchestrator: Arc::new(orchestrator),
            ingestor: Arc::new(Ingestor::new(embedder, index.clone())?),
            index,
        })
    }
}
