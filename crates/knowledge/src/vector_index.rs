//! Vector index abstraction for stored passages.
//!
//! Defines a trait for provider-agnostic vector storage and retrieval.

use crate::types::IndexedDocument;
use agrodoc_core::AppResult;

/// Trait for vector index backends.
///
/// Methods take `&self` so one index can be shared across concurrent
/// requests; implementations handle their own synchronization.
pub trait VectorIndex: Send + Sync {
    /// Insert or replace documents with their embeddings.
    fn upsert(&self, documents: &[IndexedDocument]) -> AppResult<()>;

    /// Search for the top-k most similar documents to the query embedding.
    ///
    /// Returns documents ordered by descending similarity score. `top_k` is
    /// a cap; a smaller index returns fewer results.
    fn search(
        &self,
        query_embedding: &[f32],
        top_k: usize,
    ) -> AppResult<Vec<(IndexedDocument, f32)>>;

    /// Number of stored documents.
    fn count(&self) -> AppResult<u64>;

    /// Remove every stored document.
    fn reset(&self) -> AppResult<()>;
}
