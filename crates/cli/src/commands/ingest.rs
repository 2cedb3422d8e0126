//! Ingest command handler.
//!
//! Reads files (walking directories), packages them as an ingestion
//! request and stores their passages in the knowledge base.

use agrodoc_core::{config::AppConfig, AppError, AppResult};
use agrodoc_knowledge::IngestRequest;
use agrodoc_rag::Services;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use clap::Args;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions read as plain text.
const TEXT_EXTENSIONS: &[&str] = &["txt", "md", "markdown", "csv"];

/// Ingest documents into the knowledge base
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// Files or directories to ingest (.txt, .md, .csv, .pdf)
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Clear the knowledge base before ingesting
    #[arg(long)]
    pub reset: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IngestCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ingest command");
        tracing::debug!("Ingest options: {:?}", self);

        let request = collect_documents(&self.paths)?;
        tracing::info!("Collected {} documents", request.documents.len());

        let services = Services::from_config(config)?;
        if self.reset {
            services.index.reset()?;
        }

        let stats = services.ingestor.ingest(&request).await?;

        if self.json {
            let output = serde_json::json!({
                "message": stats.message(),
                "documents": stats.documents_count,
                "chunks": stats.chunks_count,
                "total": services.index.count()?,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", stats.message());
        }

        Ok(())
    }
}

/// Build an ingestion request from files and directory trees.
///
/// PDFs are sent base64-encoded with `type: "pdf"`; unsupported files are
/// skipped.
pub fn collect_documents(paths: &[PathBuf]) -> AppResult<IngestRequest> {
    let mut request = IngestRequest::default();

    for path in paths {
        if !path.exists() {
            return Err(AppError::InvalidInput(format!(
                "Path does not exist: {}",
                path.display()
            )));
        }

        for entry in WalkDir::new(path)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let entry_path = entry.path();
            if !entry_path.is_file() {
                continue;
            }

            if let Some((document, metadata)) = read_document(entry_path)? {
                request.documents.push(document);
                request.metadata.push(metadata);
            }
        }
    }

    Ok(request)
}

fn read_document(path: &Path) -> AppResult<Option<(String, Map<String, Value>)>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);

    let mut metadata = Map::new();
    let source = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    metadata.insert("source".to_string(), Value::String(source));

    match extension.as_deref() {
        Some("pdf") => {
            let bytes = std::fs::read(path)?;
            metadata.insert("type".to_string(), Value::String("pdf".to_string()));
            Ok(Some((BASE64.encode(bytes), metadata)))
        }
        Some(ext) if TEXT_EXTENSIONS.contains(&ext) => {
            let text = std::fs::read_to_string(path)?;
            Ok(Some((text, metadata)))
        }
        _ => {
            tracing::warn!("Skipping unsupported file: {:?}", path);
            Ok(None)
        }
    }
}
