use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rag_client::{Action, ClientError, QueryController, RagBackend};

use crate::render::render_response;
use crate::shell;

/// rag-query - ask questions about a document through a RAG service
#[derive(Parser)]
#[command(name = "rag-query")]
#[command(about = "Upload a document to a RAG service and ask questions about it")]
#[command(version)]
pub struct Cli {
    /// Base URL of the RAG service (overrides RAG_API_URL)
    #[arg(long, global = true, value_name = "URL")]
    pub url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload a document and ask one question about it
    Ask(AskCommand),
    /// Check that the RAG service is up
    Health,
    /// Interactive session (the default)
    Shell(ShellCommand),
}

#[derive(Parser)]
pub struct AskCommand {
    /// Document to upload before asking
    #[arg(short, long, value_name = "PATH")]
    pub file: PathBuf,

    /// Print the retrieved context under the answer
    #[arg(long)]
    pub show_context: bool,

    /// Print the final view as JSON
    #[arg(long)]
    pub json: bool,

    /// The question
    #[arg(value_name = "QUESTION", required = true, num_args = 1..)]
    pub question: Vec<String>,
}

#[derive(Parser, Default)]
pub struct ShellCommand {
    /// Document to upload when the shell starts
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,
}

/// Wraps a controller failure so the top level prints the same message the
/// view shows, while the `ClientError` stays reachable for exit codes.
async fn surfaced<B: RagBackend>(
    controller: &QueryController<B>,
    error: ClientError,
    action: Action,
) -> anyhow::Error {
    let message = controller
        .view()
        .await
        .error
        .unwrap_or_else(|| error.user_message(action));
    anyhow::Error::new(error).context(message)
}

pub async fn handle_ask<B: RagBackend>(
    controller: &QueryController<B>,
    cmd: &AskCommand,
) -> Result<()> {
    if cmd.show_context {
        controller.set_show_context(true).await;
    }

    if let Err(e) = controller.upload(Some(&cmd.file)).await {
        return Err(surfaced(controller, e, Action::Upload).await);
    }

    let question = cmd.question.join(" ");
    if let Err(e) = controller.query(&question).await {
        return Err(surfaced(controller, e, Action::Query).await);
    }

    let view = controller.view().await;
    if cmd.json {
        let json = serde_json::to_string_pretty(&view).context("Failed to serialize view")?;
        println!("{}", json);
    } else {
        print!("{}", render_response(&view));
    }
    Ok(())
}

pub async fn handle_health<B: RagBackend>(controller: &QueryController<B>) -> Result<()> {
    let status = controller.health().await.map_err(|e| {
        let message = format!("Health check failed: {}", e);
        anyhow::Error::new(e).context(message)
    })?;
    println!("Backend status: {}", status);
    Ok(())
}

pub async fn handle_shell<B: RagBackend + 'static>(
    controller: Arc<QueryController<B>>,
    cmd: ShellCommand,
) -> Result<()> {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    shell::run(controller, stdin, std::io::stdout(), cmd.file).await
}

/// Validation failures are the operator's to fix (exit 1); everything else
/// is a service or environment problem (exit 2).
pub fn exit_code(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<ClientError>() {
        Some(e) if e.is_validation() => 1,
        _ => 2,
    }
}
