use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use rag_client::{Action, QueryController, RagBackend};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;

use crate::render::{render_response, render_status};

const UPLOADED: &str = "Document uploaded and processed successfully!";

const HELP: &str = "\
Commands:
  upload <path>        upload a document and start a session
  ask <question>       ask about the uploaded document (bare text works too)
  context [on|off]     show or hide retrieved context (no argument toggles)
  status               show session and progress
  end                  end the current session
  health               check the backend
  help                 show this message
  quit                 leave the shell";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Upload(Option<PathBuf>),
    Ask(String),
    Context(Option<bool>),
    Status,
    End,
    Health,
    Help,
    Quit,
}

/// Parses one input line. Blank lines yield `Ok(None)`; anything that is not
/// a known command word is taken as a question.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "upload" => Command::Upload((!rest.is_empty()).then(|| PathBuf::from(rest))),
        "ask" => Command::Ask(rest.to_string()),
        "context" => match rest.to_ascii_lowercase().as_str() {
            "" => Command::Context(None),
            "on" | "show" => Command::Context(Some(true)),
            "off" | "hide" => Command::Context(Some(false)),
            other => return Err(format!("context expects on or off, got '{}'", other)),
        },
        "status" => Command::Status,
        "end" => Command::End,
        "health" => Command::Health,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => Command::Ask(line.to_string()),
    };
    Ok(Some(command))
}

/// A spawned upload or query finished. The failure message is captured when
/// the task ends, since the shared error slot may be cleared by another
/// action before the loop gets to print it.
struct Finished {
    action: Action,
    outcome: std::result::Result<(), String>,
}

impl Finished {
    fn new<T>(action: Action, result: rag_client::Result<T>) -> Self {
        Self {
            action,
            outcome: result.map(|_| ()).map_err(|e| e.user_message(action)),
        }
    }
}

/// Interactive loop over `input`. Uploads and queries run as background
/// tasks so the loop keeps accepting commands while they are in flight;
/// their outcome is written once they finish.
pub async fn run<B, R, W>(
    controller: Arc<QueryController<B>>,
    input: R,
    mut out: W,
    initial_file: Option<PathBuf>,
) -> Result<()>
where
    B: RagBackend + 'static,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<Finished>();
    let mut pending = 0usize;
    let mut lines = input.lines();

    writeln!(out, "RAG query shell. Type 'help' for commands.")?;
    if let Some(path) = initial_file {
        let result = controller.upload(Some(&path)).await;
        report(&controller, &mut out, Finished::new(Action::Upload, result)).await?;
    }

    loop {
        out.flush()?;
        tokio::select! {
            Some(done) = rx.recv() => {
                pending -= 1;
                report(&controller, &mut out, done).await?;
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let command = match parse_command(&line) {
                    Ok(Some(command)) => command,
                    Ok(None) => continue,
                    Err(message) => {
                        writeln!(out, "{}", message)?;
                        continue;
                    }
                };

                match command {
                    Command::Upload(path) => {
                        spawn_upload(&controller, &tx, path);
                        pending += 1;
                    }
                    Command::Ask(question) => {
                        spawn_query(&controller, &tx, question);
                        pending += 1;
                    }
                    Command::Context(show) => {
                        let shown = match show {
                            Some(show) => {
                                controller.set_show_context(show).await;
                                show
                            }
                            None => controller.toggle_context().await,
                        };
                        writeln!(out, "Context {}", if shown { "shown" } else { "hidden" })?;
                        let view = controller.view().await;
                        if view.context_visible() {
                            writeln!(out, "{}", render_response(&view))?;
                        }
                    }
                    Command::Status => {
                        writeln!(out, "{}", render_status(&controller.view().await))?;
                    }
                    Command::End => match controller.end_session().await {
                        Ok(()) => writeln!(out, "Session ended")?,
                        Err(e) if e.is_validation() => writeln!(out, "{}", e)?,
                        Err(e) => writeln!(out, "Session cleanup failed: {}", e)?,
                    },
                    Command::Health => match controller.health().await {
                        Ok(status) => writeln!(out, "Backend status: {}", status)?,
                        Err(e) => writeln!(out, "Health check failed: {}", e)?,
                    },
                    Command::Help => writeln!(out, "{}", HELP)?,
                    Command::Quit => break,
                }
            }
        }
    }

    while pending > 0 {
        let Some(done) = rx.recv().await else { break };
        pending -= 1;
        report(&controller, &mut out, done).await?;
    }
    out.flush()?;
    Ok(())
}

fn spawn_upload<B: RagBackend + 'static>(
    controller: &Arc<QueryController<B>>,
    tx: &mpsc::UnboundedSender<Finished>,
    path: Option<PathBuf>,
) {
    let controller = controller.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = controller.upload(path.as_deref()).await;
        let _ = tx.send(Finished::new(Action::Upload, result));
    });
}

fn spawn_query<B: RagBackend + 'static>(
    controller: &Arc<QueryController<B>>,
    tx: &mpsc::UnboundedSender<Finished>,
    question: String,
) {
    let controller = controller.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = controller.query(&question).await;
        let _ = tx.send(Finished::new(Action::Query, result));
    });
}

async fn report<B: RagBackend, W: Write>(
    controller: &QueryController<B>,
    out: &mut W,
    done: Finished,
) -> Result<()> {
    if let Err(message) = done.outcome {
        writeln!(out, "{}", message)?;
        return Ok(());
    }
    match done.action {
        Action::Upload => writeln!(out, "{}", UPLOADED)?,
        Action::Query => writeln!(out, "{}", render_response(&controller.view().await))?,
    }
    Ok(())
}
