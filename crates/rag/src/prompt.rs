//! Answer prompt template.

use crate::types::ContextItem;
use agrodoc_core::{AppError, AppResult};
use handlebars::Handlebars;
use serde::Serialize;

const TEMPLATE_NAME: &str = "answer";

pub const ANSWER_TEMPLATE: &str = "You are AgroDoc, a smart farmer assistant. Use the following context to answer the query accurately and concisely. If relevant, include agricultural insights or local weather advice.
Context: {{context}}
Query: {{query}}
Answer in clear, simple language suitable for low-tech farmers.";

#[derive(Serialize)]
struct PromptVars<'a> {
    context: String,
    query: &'a str,
}

/// Renders the answer prompt from a query and its context.
pub struct PromptBuilder {
    handlebars: Handlebars<'static>,
}

impl PromptBuilder {
    pub fn new() -> AppResult<Self> {
        Self::with_template(ANSWER_TEMPLATE)
    }

    pub fn with_template(template: &str) -> AppResult<Self> {
        let mut handlebars = Handlebars::new();

        // Plain text, not HTML
        handlebars.register_escape_fn(handlebars::no_escape);

        handlebars
            .register_template_string(TEMPLATE_NAME, template)
            .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

        Ok(Self { handlebars })
    }

    /// Context texts are joined by newlines, in order.
    pub fn render(&self, query: &str, context: &[ContextItem]) -> AppResult<String> {
        let vars = PromptVars {
            context: context
                .iter()
                .map(|item| item.text.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
            query,
        };

        self.handlebars
            .render(TEMPLATE_NAME, &vars)
            .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
    }
}
