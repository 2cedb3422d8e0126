//! Completion service integration for AgroDoc.
//!
//! This crate provides a provider-agnostic abstraction for prompt-to-text
//! completion through a unified trait-based interface.
//!
//! # Providers
//! - **Groq**: hosted OpenAI-compatible API (default)
//! - **Ollama**: local LLM runtime
//!
//! # Example
//! ```no_run
//! use agrodoc_llm::{LlmClient, LlmRequest, providers::GroqClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GroqClient::new(std::env::var("GROQ_API_KEY").ok());
//! let request = LlmRequest::new("How to improve wheat yield?", "llama3-8b-8192");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::{GroqClient, OllamaClient};
