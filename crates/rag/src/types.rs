//! Query pipeline request/response types.

use agrodoc_core::{AppError, AppResult};
use agrodoc_knowledge::{source_metadata, Metadata};
use serde::{Deserialize, Serialize};

/// Language the answer is translated into when none is requested.
pub const DEFAULT_TARGET_LANG: &str = "ur";

/// Raw query as received from a caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub query: String,

    #[serde(default)]
    pub location: Option<String>,

    #[serde(default)]
    pub target_lang: Option<String>,
}

impl QueryRequest {
    /// Validate into a [`Query`].
    ///
    /// Only an empty query is rejected. An empty location counts as absent.
    pub fn into_query(self) -> AppResult<Query> {
        if self.query.is_empty() {
            return Err(AppError::InvalidInput("Query is required".to_string()));
        }

        Ok(Query {
            text: self.query,
            location: self.location.filter(|l| !l.is_empty()),
            target_lang: self
                .target_lang
                .unwrap_or_else(|| DEFAULT_TARGET_LANG.to_string()),
        })
    }
}

/// A validated farmer query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub text: String,
    pub location: Option<String>,
    pub target_lang: String,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            location: None,
            target_lang: DEFAULT_TARGET_LANG.to_string(),
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_target_lang(mut self, lang: impl Into<String>) -> Self {
        self.target_lang = lang.into();
        self
    }
}

/// One passage of supporting context shown alongside an answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextItem {
    pub text: String,
    pub metadata: Metadata,
}

impl ContextItem {
    pub fn new(text: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            text: text.into(),
            metadata,
        }
    }

    /// Context item tagged with a single `source`.
    pub fn from_source(text: impl Into<String>, source: &str) -> Self {
        Self::new(text, source_metadata(source))
    }
}

/// Successful pipeline result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub answer: String,
    pub translated_answer: String,
    pub context: Vec<ContextItem>,
}

/// Body returned to callers: an answer or an error message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryResponse {
    Answer(Answer),
    Error { error: String },
}

impl QueryResponse {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }
}

/// Result of consulting an optional upstream source.
///
/// Absence is not an error; the caller decides what to do without it.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceOutcome<T> {
    Available(T),
    Unavailable(String),
}
