//! Answer translation.
//!
//! Providers accept at most 500 characters per request, so text is sent in
//! consecutive 400-character pieces and the translations are concatenated.
//! Piece boundaries are positional and may fall inside a word.

pub mod mymemory;

pub use mymemory::MyMemoryTranslator;

use agrodoc_core::AppResult;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Largest piece of text sent in one translation request.
pub const MAX_CHUNK_CHARS: usize = 400;

/// Source language of generated answers; translating into it is a no-op.
pub const SOURCE_LANG: &str = "en";

/// A service translating English text into a target language.
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    fn provider_name(&self) -> &str;

    async fn translate(&self, text: &str, target_lang: &str) -> AppResult<String>;
}

/// Per-language registry of translation providers.
#[derive(Clone, Default)]
pub struct Translator {
    providers: HashMap<String, Arc<dyn TranslationProvider>>,
}

impl Translator {
    /// Translator with no registered languages.
    pub fn new() -> Self {
        Self::default()
    }

    /// Translator with Urdu served by MyMemory.
    pub fn with_defaults() -> Self {
        Self::new().register("ur", Arc::new(MyMemoryTranslator::new()))
    }

    pub fn register(mut self, lang: impl Into<String>, provider: Arc<dyn TranslationProvider>) -> Self {
        self.providers.insert(lang.into(), provider);
        self
    }

    /// Translate `text` into `target_lang`.
    ///
    /// Never fails: an unknown language or any failed piece yields the
    /// original text unchanged.
    pub async fn translate(&self, text: &str, target_lang: &str) -> String {
        if target_lang == SOURCE_LANG {
            return text.to_string();
        }

        let Some(provider) = self.providers.get(target_lang) else {
            tracing::warn!("No translator available for language: {}", target_lang);
            return text.to_string();
        };

        let mut translated = String::with_capacity(text.len());
        for piece in split_chunks(text, MAX_CHUNK_CHARS) {
            match provider.translate(piece, target_lang).await {
                Ok(part) => translated.push_str(&part),
                Err(e) => {
                    tracing::error!("Error translating answer: {}", e);
                    return text.to_string();
                }
            }
        }

        translated
    }
}

/// Split into consecutive pieces of at most `max_chars` characters.
///
/// Counts Unicode scalar values, so multi-byte characters are never cut.
pub fn split_chunks(text: &str, max_chars: usize) -> Vec<&str> {
    if max_chars == 0 {
        return vec![];
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (offset, _) in text.char_indices() {
        if count == max_chars {
            pieces.push(&text[start..offset]);
            start = offset;
            count = 0;
        }
        count += 1;
    }

    if start < text.len() {
        pieces.push(&text[start..]);
    }

    pieces
}
