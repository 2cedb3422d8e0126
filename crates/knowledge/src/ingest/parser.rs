//! Document decoding and metadata normalization.

use crate::types::{Metadata, MetadataValue};
use agrodoc_core::{AppError, AppResult};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde_json::{Map, Value};

/// Metadata key carrying the document kind.
pub const TYPE_KEY: &str = "type";

/// How a raw document string is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Plain text, used as-is.
    Text,
    /// Base64-encoded PDF bytes.
    Pdf,
}

impl DocumentKind {
    /// Detect the kind from a document's metadata (`type: "pdf"`).
    pub fn from_metadata(metadata: &Map<String, Value>) -> Self {
        match metadata.get(TYPE_KEY).and_then(Value::as_str) {
            Some("pdf") => Self::Pdf,
            _ => Self::Text,
        }
    }
}

/// Turn a raw document into text.
///
/// A PDF that fails to decode is an input error. A PDF that decodes but
/// yields no extractable text becomes an empty string, which the caller
/// skips.
pub fn extract_text(raw: &str, kind: DocumentKind) -> AppResult<String> {
    match kind {
        DocumentKind::Text => Ok(raw.to_string()),
        DocumentKind::Pdf => {
            let bytes = BASE64
                .decode(raw.trim())
                .map_err(|e| AppError::InvalidInput(format!("Error processing PDF: {}", e)))?;

            match pdf_extract::extract_text_from_mem(&bytes) {
                Ok(text) => Ok(text),
                Err(e) => {
                    tracing::error!("Error parsing PDF: {}", e);
                    Ok(String::new())
                }
            }
        }
    }
}

/// Keep scalar metadata values; nulls, arrays and objects are dropped.
pub fn normalize_metadata(raw: &Map<String, Value>) -> Metadata {
    let mut metadata = Metadata::new();

    for (key, value) in raw {
        match MetadataValue::from_json(value) {
            Some(scalar) => {
                metadata.insert(key.clone(), scalar);
            }
            None => {
                tracing::warn!("Dropping non-scalar metadata value for key '{}'", key);
            }
        }
    }

    metadata
}
