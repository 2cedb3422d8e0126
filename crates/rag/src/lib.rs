//! AgroDoc query pipeline.
//!
//! Answers farmers' questions by retrieving stored passages, adding live
//! weather for a supplied location, generating an answer with a completion
//! service and translating it into the requested language.
//!
//! Upstream failures degrade rather than abort: retrieval and weather
//! failures shrink the context, a generation failure falls back to the last
//! cached answer, and a translation failure returns the untranslated text.

pub mod cache;
pub mod factory;
pub mod generator;
pub mod orchestrator;
pub mod prompt;
pub mod retriever;
pub mod translate;
pub mod types;
pub mod weather;

#[cfg(test)]
mod tests;

pub use cache::AnswerCache;
pub use factory::Services;
pub use generator::{AnswerGenerator, FALLBACK_ANSWER};
pub use orchestrator::{QueryOrchestrator, Stage, PROCESS_FAILURE};
pub use retriever::ContextRetriever;
pub use translate::{TranslationProvider, Translator};
pub use types::{Answer, ContextItem, Query, QueryRequest, QueryResponse, SourceOutcome};
pub use weather::{OpenWeatherMapClient, WeatherAugmenter, WeatherProvider, WeatherReading};
