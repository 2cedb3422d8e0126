//! Knowledge system type definitions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metadata attached to stored passages and context items.
///
/// Ordered so that serialized metadata is stable across runs.
pub type Metadata = BTreeMap<String, MetadataValue>;

/// Metadata key naming where a passage came from.
pub const SOURCE_KEY: &str = "source";

/// A scalar metadata value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl MetadataValue {
    /// Convert a JSON value, rejecting nulls, arrays and objects.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(b) => Some(Self::Bool(*b)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Self::Integer)
                .or_else(|| n.as_f64().map(Self::Float)),
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
            _ => None,
        }
    }

    /// Borrow the value as text, if it is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Build metadata with a single `source` entry.
pub fn source_metadata(source: impl Into<String>) -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert(SOURCE_KEY.to_string(), MetadataValue::Text(source.into()));
    metadata
}

/// A passage stored in the vector index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedDocument {
    /// Unique document identifier
    pub id: String,

    /// Passage text
    pub text: String,

    /// Embedding vector
    pub embedding: Vec<f32>,

    /// Scalar metadata (always carries `source` after ingestion)
    pub metadata: Metadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_scalars() {
        assert_eq!(
            MetadataValue::from_json(&serde_json::json!(3)),
            Some(MetadataValue::Integer(3))
        );
        assert_eq!(
            MetadataValue::from_json(&serde_json::json!(2.5)),
            Some(MetadataValue::Float(2.5))
        );
        assert_eq!(
            MetadataValue::from_json(&serde_json::json!("wheat.pdf")),
            Some(MetadataValue::Text("wheat.pdf".to_string()))
        );
        assert_eq!(MetadataValue::from_json(&serde_json::json!([1, 2])), None);
        assert_eq!(MetadataValue::from_json(&serde_json::Value::Null), None);
    }

    #[test]
    fn test_metadata_serializes_as_plain_map() {
        let mut metadata = source_metadata("sample_doc.txt");
        metadata.insert("page".to_string(), MetadataValue::Integer(2));

        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json, serde_json::json!({"page": 2, "source": "sample_doc.txt"}));

        let back: Metadata = serde_json::from_value(json).unwrap();
        assert_eq!(back, metadata);
    }
}
