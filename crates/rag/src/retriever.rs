//! Top-k passage retrieval from the vector index.

use crate::types::{ContextItem, SourceOutcome};
use agrodoc_core::AppResult;
use agrodoc_knowledge::{EmbeddingProvider, VectorIndex};
use std::sync::Arc;

/// Default number of passages retrieved per query.
pub const DEFAULT_TOP_K: usize = 5;

/// Embeds the query and looks up the nearest stored passages.
pub struct ContextRetriever {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    top_k: usize,
}

impl ContextRetriever {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, index: Arc<dyn VectorIndex>) -> Self {
        Self {
            embedder,
            index,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Retrieve up to `top_k` passages, most similar first.
    ///
    /// Embedding or index failures are reported as `Unavailable`.
    pub async fn retrieve(&self, query: &str) -> SourceOutcome<Vec<ContextItem>> {
        match self.search(query).await {
            Ok(items) => SourceOutcome::Available(items),
            Err(e) => {
                tracing::error!("Error retrieving context: {}", e);
                SourceOutcome::Unavailable(e.to_string())
            }
        }
    }

    async fn search(&self, query: &str) -> AppResult<Vec<ContextItem>> {
        let query_embedding = self.embedder.embed(query).await?;
        let results = self.index.search(&query_embedding, self.top_k)?;

        if let Some((_, top)) = results.first() {
            tracing::debug!("Retrieved {} passages (top score: {:.3})", results.len(), top);
        }

        Ok(results
            .into_iter()
            .map(|(document, _score)| ContextItem::new(document.text, document.metadata))
            .collect())
    }
}
