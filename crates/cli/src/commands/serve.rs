//! Serve command handler.

use crate::server::{self, AppState};
use agrodoc_core::{config::AppConfig, AppResult};
use agrodoc_rag::Services;
use clap::Args;

/// Run the HTTP API server
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Address to bind (overrides config)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides config)
    #[arg(long)]
    pub port: Option<u16>,
}

impl ServeCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing serve command");

        let mut config = config.clone();
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }

        let services = Services::from_config(&config)?;
        let state = AppState::new(services.orchestrator, services.ingestor);

        server::run(state, &config.bind_address()).await
    }
}
