//! Ingestion and retrieval scenarios against a real SQLite index.

mod ingest_search;
