//! Ask command handler.
//!
//! Runs one query through the full pipeline and prints the answer.

use agrodoc_core::{config::AppConfig, AppError, AppResult};
use agrodoc_rag::{Answer, QueryRequest, QueryResponse, Services};
use clap::Args;

/// Ask a farming question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub query: String,

    /// Location for live weather context (e.g. "Lahore")
    #[arg(short, long)]
    pub location: Option<String>,

    /// Target language code for the translated answer
    #[arg(long, default_value = "ur")]
    pub lang: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let services = Services::from_config(config)?;
        let request = QueryRequest {
            query: self.query.clone(),
            location: self.location.clone(),
            target_lang: Some(self.lang.clone()),
        };

        let response = services.orchestrator.handle(request).await?;

        if self.json {
            let json = serde_json::to_string_pretty(&response)?;
            println!("{}", json);
            return match response {
                QueryResponse::Answer(_) => Ok(()),
                QueryResponse::Error { error } => Err(AppError::Other(error)),
            };
        }

        match response {
            QueryResponse::Answer(answer) => {
                print_answer(&answer, &self.lang);
                Ok(())
            }
            QueryResponse::Error { error } => Err(AppError::Other(error)),
        }
    }
}

fn print_answer(answer: &Answer, lang: &str) {
    println!("{}", answer.answer);

    if answer.translated_answer != answer.answer {
        println!();
        println!("[{}] {}", lang, answer.translated_answer);
    }

    if !answer.context.is_empty() {
        println!();
        println!("Sources:");
        for item in &answer.context {
            let source = item
                .metadata
                .get("source")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown");
            println!("  - {}", source);
        }
    }
}
