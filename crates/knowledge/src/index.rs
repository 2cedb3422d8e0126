//! SQLite-backed vector index for ingested passages.
//!
//! Embeddings are stored as little-endian f32 blobs and ranked by cosine
//! similarity at query time.

use crate::types::{IndexedDocument, Metadata};
use crate::vector_index::VectorIndex;
use agrodoc_core::{AppError, AppResult};
use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    id TEXT PRIMARY KEY,
    text TEXT NOT NULL,
    embedding BLOB NOT NULL,
    metadata TEXT NOT NULL,
    ingested_at TEXT NOT NULL
);
"#;

/// Vector index persisted in a single SQLite file.
pub struct SqliteIndex {
    conn: Mutex<Connection>,
}

impl SqliteIndex {
    /// Open (or create) the index database at `db_path`.
    pub fn open(db_path: &Path) -> AppResult<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::Knowledge(format!("Failed to create index directory: {}", e))
                })?;
            }
        }

        let conn = Connection::open(db_path)
            .map_err(|e| AppError::Knowledge(format!("Failed to open SQLite index: {}", e)))?;

        tracing::debug!("Opened SQLite index at {:?}", db_path);
        Self::with_connection(conn)
    }

    /// Create an index that lives only in memory.
    pub fn in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::Knowledge(format!("Failed to open SQLite index: {}", e)))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> AppResult<Self> {
        conn.execute_batch(SCHEMA)
            .map_err(|e| AppError::Knowledge(format!("Failed to create tables: {}", e)))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Knowledge("Index connection lock poisoned".to_string()))
    }
}

impl VectorIndex for SqliteIndex {
    fn upsert(&self, documents: &[IndexedDocument]) -> AppResult<()> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| AppError::Knowledge(format!("Failed to begin transaction: {}", e)))?;

        let ingested_at = Utc::now().to_rfc3339();
        for document in documents {
            let metadata_json = serde_json::to_string(&document.metadata)?;
            tx.execute(
                "INSERT OR REPLACE INTO documents (id, text, embedding, metadata, ingested_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    document.id,
                    document.text,
                    embedding_to_bytes(&document.embedding),
                    metadata_json,
                    ingested_at,
                ],
            )
            .map_err(|e| AppError::Knowledge(format!("Failed to insert document: {}", e)))?;
        }

        tx.commit()
            .map_err(|e| AppError::Knowledge(format!("Failed to commit documents: {}", e)))?;

        tracing::info!("Stored {} document chunks in index", documents.len());
        Ok(())
    }

    fn search(
        &self,
        query_embedding: &[f32],
        top_k: usize,
    ) -> AppResult<Vec<(IndexedDocument, f32)>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT id, text, embedding, metadata FROM documents")
            .map_err(|e| AppError::Knowledge(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Vec<u8>>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })
            .map_err(|e| AppError::Knowledge(format!("Failed to query documents: {}", e)))?;

        let mut results = Vec::new();
        for row in rows {
            let (id, text, embedding_bytes, metadata_json) =
                row.map_err(|e| AppError::Knowledge(format!("Failed to read row: {}", e)))?;

            let embedding = bytes_to_embedding(&embedding_bytes)?;
            let metadata: Metadata = serde_json::from_str(&metadata_json)?;
            let score = cosine_similarity(query_embedding, &embedding);

            results.push((
                IndexedDocument {
                    id,
                    text,
                    embedding,
                    metadata,
                },
                score,
            ));
        }

        results.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(top_k);

        tracing::debug!(
            "Retrieved {} documents (requested top-{})",
            results.len(),
            top_k
        );

        Ok(results)
    }

    fn count(&self) -> AppResult<u64> {
        let conn = self.lock()?;
        conn.query_row("SELECT COUNT(*) FROM documents", [], |row| {
            row.get::<_, i64>(0)
        })
        .map(|count| count as u64)
        .map_err(|e| AppError::Knowledge(format!("Failed to count documents: {}", e)))
    }

    fn reset(&self) -> AppResult<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM documents", [])
            .map_err(|e| AppError::Knowledge(format!("Failed to delete documents: {}", e)))?;

        tracing::info!("Reset vector index");
        Ok(())
    }
}

/// Convert embedding vector to bytes for storage.
fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Convert bytes back to embedding vector.
fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::Knowledge(
            "Invalid embedding bytes length".to_string(),
        ));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

/// Cosine similarity; mismatched or zero vectors score 0.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::source_metadata;
    use tempfile::TempDir;

    fn document(id: &str, text: &str, embedding: Vec<f32>) -> IndexedDocument {
        IndexedDocument {
            id: id.to_string(),
            text: text.to_string(),
            embedding,
            metadata: source_metadata("sample_doc.txt"),
        }
    }

    #[test]
    fn test_open_creates_parent_directory() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data/processed/agrodoc.db");

        let index = SqliteIndex::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(index.count().unwrap(), 0);
    }

    #[test]
    fn test_search_orders_by_similarity() {
        let index = SqliteIndex::in_memory().unwrap();
        index
            .upsert(&[
                document("pest", "Neem oil controls aphids", vec![0.0, 1.0, 0.0]),
                document("wheat", "Sow wheat in November", vec![1.0, 0.1, 0.0]),
                document("rice", "Transplant rice seedlings", vec![0.7, 0.7, 0.0]),
            ])
            .unwrap();

        let results = index.search(&[1.0, 0.0, 0.0], 2).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0.id, "wheat");
        assert_eq!(results[1].0.id, "rice");
        assert!(results[0].1 >= results[1].1);
        assert_eq!(
            results[0].0.metadata.get("source").and_then(|v| v.as_str()),
            Some("sample_doc.txt")
        );
    }

    #[test]
    fn test_top_k_is_a_cap() {
        let index = SqliteIndex::in_memory().unwrap();
        index
            .upsert(&[document("only", "Only passage", vec![1.0, 0.0])])
            .unwrap();

        let results = index.search(&[1.0, 0.0], 5).unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_upsert_replaces_and_reset_clears() {
        let index = SqliteIndex::in_memory().unwrap();
        index.upsert(&[document("a", "old", vec![1.0])]).unwrap();
        index.upsert(&[document("a", "new", vec![1.0])]).unwrap();

        assert_eq!(index.count().unwrap(), 1);
        assert_eq!(index.search(&[1.0], 1).unwrap()[0].0.text, "new");

        index.reset().unwrap();
        assert_eq!(index.count().unwrap(), 0);
    }

    #[test]
    fn test_embedding_bytes_length_check() {
        assert!(bytes_to_embedding(&[0, 0, 0]).is_err());
        let bytes = embedding_to_bytes(&[0.5, -1.0]);
        assert_eq!(bytes_to_embedding(&bytes).unwrap(), vec![0.5, -1.0]);
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 0.001);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 0.001);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }
}
