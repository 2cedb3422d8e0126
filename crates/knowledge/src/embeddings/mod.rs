//! Embedding providers.
//!
//! The embedding model is an external collaborator: text in, vector out.
//! Providers are built once from configuration and shared.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};
