use crate::embeddings::providers::TrigramProvider;
use crate::embeddings::EmbeddingProvider;
use crate::index::SqliteIndex;
use crate::ingest::{DocumentChunker, IngestRequest, Ingestor};
use crate::types::MetadataValue;
use crate::vector_index::VectorIndex;
use agrodoc_core::{AppError, AppResult};
use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// Embedder that counts calls and delegates to the trigram provider.
#[derive(Debug)]
struct CountingEmbedder {
    inner: TrigramProvider,
    calls: AtomicUsize,
}

impl CountingEmbedder {
    fn new() -> Self {
        Self {
            inner: TrigramProvider::new(64),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for CountingEmbedder {
    fn provider_name(&self) -> &str {
        "counting"
    }

    fn model_name(&self) -> &str {
        "counting"
    }

    fn dimensions(&self) -> usize {
        64
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.embed_batch(texts).await
    }
}

fn meta(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn setup() -> (TempDir, Arc<SqliteIndex>, Arc<CountingEmbedder>) {
    let dir = TempDir::new().unwrap();
    let index = Arc::new(SqliteIndex::open(&dir.path().join("processed/agrodoc.db")).unwrap());
    (dir, index, Arc::new(CountingEmbedder::new()))
}

#[tokio::test]
async fn test_ingest_then_search_finds_relevant_passage() {
    let (_dir, index, embedder) = setup();
    let ingestor = Ingestor::new(embedder.clone(), index.clone()).unwrap();

    let request = IngestRequest {
        documents: vec![
            "Wheat yield improves with timely sowing in November and split nitrogen doses."
                .to_string(),
            "Cotton bollworm is controlled with pheromone traps and resistant varieties."
                .to_string(),
        ],
        metadata: vec![meta(json!({"source": "wheat_guide.txt"}))],
    };

    let stats = ingestor.ingest(&request).await.unwrap();
    assert_eq!(stats.chunks_count, 2);
    assert_eq!(stats.documents_count, 2);
    assert_eq!(stats.message(), "Ingested 2 document chunks");
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 1);
    assert_eq!(index.count().unwrap(), 2);

    let query = embedder.embed("How to improve wheat yield?").await.unwrap();
    let results = index.search(&query, 1).unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].0.text.starts_with("Wheat yield"));
    assert_eq!(
        results[0].0.metadata["source"].as_str(),
        Some("wheat_guide.txt")
    );
}

#[tokio::test]
async fn test_default_source_and_missing_metadata() {
    let (_dir, index, embedder) = setup();
    let ingestor = Ingestor::new(embedder.clone(), index.clone()).unwrap();

    let request = IngestRequest {
        documents: vec!["first".to_string(), "  second passage  ".to_string()],
        metadata: vec![],
    };
    ingestor.ingest(&request).await.unwrap();

    let query = embedder.embed("second passage").await.unwrap();
    let results = index.search(&query, 2).unwrap();
    let mut sources: Vec<_> = results
        .iter()
        .filter_map(|(doc, _)| doc.metadata["source"].as_str().map(str::to_string))
        .collect();
    sources.sort();
    assert_eq!(sources, vec!["document_0", "document_1"]);
    assert!(results.iter().any(|(doc, _)| doc.text == "second passage"));
}

#[tokio::test]
async fn test_no_documents_is_invalid_input() {
    let (_dir, index, embedder) = setup();
    let ingestor = Ingestor::new(embedder.clone(), index).unwrap();

    let err = ingestor.ingest(&IngestRequest::default()).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));
    assert_eq!(err.to_string(), "No documents provided");
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_blank_documents_skipped_without_embedding() {
    let (_dir, index, embedder) = setup();
    let ingestor = Ingestor::new(embedder.clone(), index.clone()).unwrap();

    let request = IngestRequest {
        documents: vec!["   ".to_string(), "\n\t".to_string()],
        metadata: vec![],
    };
    let stats = ingestor.ingest(&request).await.unwrap();

    assert_eq!(stats.chunks_count, 0);
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    assert_eq!(index.count().unwrap(), 0);
}

#[tokio::test]
async fn test_bad_pdf_rejects_whole_batch() {
    let (_dir, index, embedder) = setup();
    let ingestor = Ingestor::new(embedder, index.clone()).unwrap();

    let request = IngestRequest {
        documents: vec!["Plain text".to_string(), "%%% not base64".to_string()],
        metadata: vec![meta(json!({})), meta(json!({"type": "pdf"}))],
    };
    let err = ingestor.ingest(&request).await.unwrap_err();

    assert!(err.to_string().starts_with("Error processing PDF"));
    assert_eq!(index.count().unwrap(), 0);
}

#[tokio::test]
async fn test_long_document_chunks_share_metadata() {
    let (_dir, index, embedder) = setup();
    let ingestor = Ingestor::new(embedder.clone(), index.clone())
        .unwrap()
        .with_chunker(DocumentChunker::new(200, 40).unwrap());

    let text = "Drip irrigation saves water in orchards. ".repeat(30);
    let request = IngestRequest {
        documents: vec![text],
        metadata: vec![meta(json!({"source": "orchard.txt", "region": "Swat", "tags": ["x"]}))],
    };
    let stats = ingestor.ingest(&request).await.unwrap();
    assert!(stats.chunks_count > 1);

    let query = embedder.embed("drip irrigation").await.unwrap();
    let results = index.search(&query, 100).unwrap();
    assert_eq!(results.len(), stats.chunks_count);
    for (doc, _) in results {
        assert_eq!(doc.metadata["region"], MetadataValue::from("Swat"));
        assert!(!doc.metadata.contains_key("tags"));
        assert!(doc.text.chars().count() <= 200);
    }
}
