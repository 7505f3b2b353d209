use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};

use ecoscan_config::EcoscanConfig;
use ecoscan_llm::{AnalysisProvider, GroqProvider};
use ecoscan_ocr::TesseractEngine;
use ecoscan_store::SqlitePool;

mod cli;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    let env_filter = format!(
        "ecoscan_cli={0},ecoscan_web={0},ecoscan_ocr={0},ecoscan_store={0},ecoscan_llm={0}",
        log_level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(env_filter)),
        )
        .init();

    let mut config = EcoscanConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.web.port = port;
            }
            if config.llm.api_key.is_empty() {
                warn!("GROQ_API_KEY is not set; scans will produce degraded analyses");
            }
            let llm: Arc<dyn AnalysisProvider> = Arc::new(GroqProvider::new(config.llm.clone()));
            ecoscan_web::start_server(config, llm).await?;
        }

        Commands::Ocr => {
            let engine = Arc::new(TesseractEngine::new(&config.ocr));
            ecoscan_ocr::start_service(&config.ocr, engine).await?;
        }

        Commands::InitDb => {
            let path = config.storage.path.clone();
            let _pool = SqlitePool::new(config.storage)?;
            info!(path = %path.display(), "Database initialized");
        }
    }

    Ok(())
}
