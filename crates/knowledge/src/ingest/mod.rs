//! Document ingestion: decode, split, embed and store.

pub mod chunker;
pub mod parser;

pub use chunker::{DocumentChunker, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
pub use parser::DocumentKind;

use crate::embeddings::EmbeddingProvider;
use crate::types::{IndexedDocument, MetadataValue, SOURCE_KEY};
use crate::vector_index::VectorIndex;
use agrodoc_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Instant;

/// Batch of documents to ingest.
///
/// `metadata[i]` belongs to `documents[i]`; missing entries default to `{}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestRequest {
    #[serde(default)]
    pub documents: Vec<String>,

    #[serde(default)]
    pub metadata: Vec<Map<String, Value>>,
}

/// Outcome of an ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    /// Documents that produced at least one passage.
    pub documents_count: usize,

    /// Passages stored in the index.
    pub chunks_count: usize,
}

impl IngestStats {
    pub fn message(&self) -> String {
        format!("Ingested {} document chunks", self.chunks_count)
    }
}

/// Feeds documents into the vector index.
pub struct Ingestor {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    chunker: DocumentChunker,
}

impl Ingestor {
    /// Create an ingestor with the default passage size and overlap.
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
    ) -> AppResult<Self> {
        Ok(Self {
            embedder,
            index,
            chunker: DocumentChunker::new(DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP)?,
        })
    }

    pub fn with_chunker(mut self, chunker: DocumentChunker) -> Self {
        self.chunker = chunker;
        self
    }

    /// Ingest a batch of documents.
    ///
    /// Every passage carries its document's scalar metadata; `source`
    /// defaults to `document_{i}`.
    pub async fn ingest(&self, request: &IngestRequest) -> AppResult<IngestStats> {
        let start = Instant::now();

        if request.documents.is_empty() {
            return Err(AppError::InvalidInput("No documents provided".to_string()));
        }

        let empty = Map::new();
        let mut texts = Vec::new();
        let mut metadatas = Vec::new();
        let mut stats = IngestStats::default();

        for (i, raw) in request.documents.iter().enumerate() {
            let raw_meta = request.metadata.get(i).unwrap_or(&empty);
            let kind = DocumentKind::from_metadata(raw_meta);
            let text = parser::extract_text(raw, kind)?;
            let text = text.trim();

            if text.is_empty() {
                tracing::debug!("Skipping empty document {}", i);
                continue;
            }

            let mut metadata = parser::normalize_metadata(raw_meta);
            metadata
                .entry(SOURCE_KEY.to_string())
                .or_insert_with(|| MetadataValue::Text(format!("document_{}", i)));

            let chunks = self.chunker.split(text);
            if chunks.is_empty() {
                continue;
            }

            stats.documents_count += 1;
            for chunk in chunks {
                texts.push(chunk);
                metadatas.push(metadata.clone());
            }
        }

        if texts.is_empty() {
            tracing::info!("No content to ingest");
            return Ok(stats);
        }

        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != texts.len() {
            return Err(AppError::Knowledge(format!(
                "Embedding count mismatch: got {}, expected {}",
                embeddings.len(),
                texts.len()
            )));
        }

        let documents: Vec<IndexedDocument> = texts
            .into_iter()
            .zip(embeddings)
            .zip(metadatas)
            .map(|((text, embedding), metadata)| IndexedDocument {
                id: uuid::Uuid::new_v4().to_string(),
                text,
                embedding,
                metadata,
            })
            .collect();

        self.index.upsert(&documents)?;
        stats.chunks_count = documents.len();

        tracing::info!(
            "Ingested {} documents into {} chunks in {:.2}s",
            stats.documents_count,
            stats.chunks_count,
            start.elapsed().as_secs_f64()
        );

        Ok(stats)
    }
}
