//! Splitting document text into overlapping passages.

use agrodoc_core::{AppError, AppResult};
use text_splitter::{Characters, ChunkConfig, TextSplitter};

/// Passage size in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Characters shared between neighbouring passages.
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Recursive splitter: paragraphs, then sentences, then words, then characters.
pub struct DocumentChunker {
    splitter: TextSplitter<Characters>,
}

impl DocumentChunker {
    pub fn new(chunk_size: usize, overlap: usize) -> AppResult<Self> {
        let config = ChunkConfig::new(chunk_size)
            .with_overlap(overlap)
            .map_err(|e| AppError::Knowledge(format!("Invalid chunk configuration: {}", e)))?;

        Ok(Self {
            splitter: TextSplitter::new(config),
        })
    }

    /// Split text into trimmed, non-empty passages in document order.
    pub fn split(&self, text: &str) -> Vec<String> {
        let chunks: Vec<String> = self
            .splitter
            .chunks(text)
            .map(str::trim)
            .filter(|chunk| !chunk.is_empty())
            .map(str::to_string)
            .collect();

        tracing::debug!(
            "Chunked {} chars into {} passages",
            text.chars().count(),
            chunks.len()
        );

        chunks
    }
}
