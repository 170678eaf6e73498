mod commands;
mod render;
mod shell;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use rag_client::{ClientConfig, QueryController};

use crate::commands::{exit_code, handle_ask, handle_health, handle_shell, Cli, Commands};

#[tokio::main]
async fn main() {
    // Initialize environment variables and logging
    dotenv::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(exit_code(&e));
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = cli.url {
        config = config.with_base_url(url);
    }

    let controller = Arc::new(QueryController::from_config(&config)?);
    log::info!("Using RAG service at {}", config.base_url);

    match cli.command {
        Some(Commands::Ask(cmd)) => handle_ask(&controller, &cmd).await,
        Some(Commands::Health) => handle_health(&controller).await,
        Some(Commands::Shell(cmd)) => handle_shell(controller, cmd).await,
        None => handle_shell(controller, Default::default()).await,
    }
}
