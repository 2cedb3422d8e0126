//! Knowledge base for AgroDoc.
//!
//! Stores ingested agricultural passages with their embeddings in a local
//! SQLite vector index and serves top-k similarity search.

pub mod embeddings;
pub mod index;
pub mod ingest;
pub mod types;
pub mod vector_index;

#[cfg(test)]
mod tests;

pub use embeddings::{create_provider, EmbeddingProvider};
pub use index::SqliteIndex;
pub use ingest::{IngestRequest, IngestStats, Ingestor};
pub use types::{source_metadata, IndexedDocument, Metadata, MetadataValue, SOURCE_KEY};
pub use vector_index::VectorIndex;
