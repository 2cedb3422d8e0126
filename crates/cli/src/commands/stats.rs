//! Stats command handler.
//!
//! Shows knowledge base size and the active configuration.

use agrodoc_core::{config::AppConfig, AppResult};
use agrodoc_knowledge::{SqliteIndex, VectorIndex};
use clap::Args;

/// Show knowledge base and configuration statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing stats command");

        let index = SqliteIndex::open(&config.index_path)?;
        let chunks = index.count()?;
        let db_size_bytes = std::fs::metadata(&config.index_path)
            .map(|m| m.len())
            .unwrap_or(0);

        if self.json {
            let output = serde_json::json!({
                "indexPath": config.index_path,
                "chunks": chunks,
                "dbSizeBytes": db_size_bytes,
                "llm": {
                    "provider": config.llm.provider,
                    "model": config.llm.model,
                },
                "embedding": {
                    "provider": config.embedding.provider,
                    "model": config.embedding.model,
                    "dimensions": config.embedding.dimensions,
                },
                "cacheCapacity": config.cache.capacity,
                "topK": config.top_k,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        println!("Index:      {}", config.index_path.display());
        println!("Chunks:     {}", chunks);
        println!("Size:       {} bytes", db_size_bytes);
        println!("LLM:        {} ({})", config.llm.model, config.llm.provider);
        println!(
            "Embeddings: {} ({}, {} dims)",
            config.embedding.model, config.embedding.provider, config.embedding.dimensions
        );
        println!("Top-k:      {}", config.top_k);
        println!("Cache:      {} entries", config.cache.capacity);

        Ok(())
    }
}
