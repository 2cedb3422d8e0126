//! MyMemory translation API client.

use super::{TranslationProvider, SOURCE_LANG};
use agrodoc_core::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

pub const DEFAULT_MYMEMORY_URL: &str = "https://api.mymemory.translated.net";

pub struct MyMemoryTranslator {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MyMemoryResponse {
    response_data: ResponseData,
    #[serde(default)]
    response_status: serde_json::Value,
    #[serde(default)]
    response_details: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseData {
    translated_text: String,
}

impl MyMemoryTranslator {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_MYMEMORY_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn convert_response(body: MyMemoryResponse) -> AppResult<String> {
        // Status arrives as a number or a numeric string
        let status = match &body.response_status {
            serde_json::Value::Number(n) => n.as_u64(),
            serde_json::Value::String(s) => s.parse().ok(),
            _ => None,
        };

        if status != Some(200) {
            return Err(AppError::Translation(format!(
                "MyMemory error ({}): {}",
                body.response_status,
                body.response_details.unwrap_or_default()
            )));
        }

        Ok(body.response_data.translated_text)
    }
}

impl Default for MyMemoryTranslator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranslationProvider for MyMemoryTranslator {
    fn provider_name(&self) -> &str {
        "mymemory"
    }

    async fn translate(&self, text: &str, target_lang: &str) -> AppResult<String> {
        let url = format!("{}/get", self.base_url);
        let langpair = format!("{}|{}", SOURCE_LANG, target_lang);

        let response = self
            .client
            .get(&url)
            .query(&[("q", text), ("langpair", langpair.as_str())])
            .send()
            .await
            .map_err(|e| AppError::Translation(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Translation(format!(
                "MyMemory API error ({})",
                status
            )));
        }

        let body: MyMemoryResponse = response
            .json()
            .await
            .map_err(|e| AppError::Translation(format!("Failed to parse response: {}", e)))?;

        Self::convert_response(body)
    }
}
