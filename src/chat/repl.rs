//! The interactive loop.
//!
//! The loop sits idle waiting for a line, classifies it into a [`Step`], runs
//! that step against the [`ChatSession`], and goes back to waiting.  Only
//! [`Step::Terminate`] leaves the loop.  No per-line failure ever ends the
//! session.

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::chat::commands::{ChatCommand, help_text, parse_command};
use crate::chat::render::Renderer;
use crate::chat::session::{ChatSession, SessionStats};
use crate::error::{Error, Result};
use crate::service::CompletionService;

/// The prompt shown before every line of input.
pub const PROMPT: &str = "You: ";

/// One unit of input from the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// A line of text, without its newline.
    Line(String),
    /// Ctrl-C at the prompt.
    Interrupted,
    /// Input is exhausted (Ctrl-D or closed stdin).
    Eof,
}

/// Source of user input lines.
pub trait LineReader {
    /// Show `prompt` and block until the user produces input.
    fn read_line(&mut self, prompt: &str) -> Result<Input>;
}

/// [`LineReader`] backed by a rustyline editor with in-memory history.
pub struct RustylineReader {
    editor: DefaultEditor,
}

impl RustylineReader {
    /// Creates a reader attached to the terminal.
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new()
            .map_err(|err| Error::config(format!("cannot initialise line editor: {err}")))?;
        Ok(Self { editor })
    }
}

impl LineReader for RustylineReader {
    fn read_line(&mut self, prompt: &str) -> Result<Input> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Ok(Input::Line(line))
            }
            Err(ReadlineError::Interrupted) => Ok(Input::Interrupted),
            Err(ReadlineError::Eof) => Ok(Input::Eof),
            Err(err) => Err(Error::input(err.to_string())),
        }
    }
}

/// What a line of input asks the session to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Blank input; nothing to do.
    Skip,
    /// Ingest a file.
    Attach(String),
    /// Render the attachment registry.
    List,
    /// Print the command help.
    Help,
    /// Print session statistics.
    Report,
    /// A directive with bad arguments.
    Reject(String),
    /// Send a chat turn to the model.
    Query(String),
    /// Leave the loop.
    Terminate,
}

/// Whether the loop should keep going after a step.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Control {
    /// Return to waiting for input.
    Continue,
    /// Stop the loop.
    Quit,
}

/// Classifies one line of input.
pub fn classify(line: &str) -> Step {
    let line = line.trim();
    if line.is_empty() {
        return Step::Skip;
    }
    match parse_command(line) {
        Some(ChatCommand::Quit) => Step::Terminate,
        Some(ChatCommand::Attach(path)) => Step::Attach(path),
        Some(ChatCommand::List) => Step::List,
        Some(ChatCommand::Help) => Step::Help,
        Some(ChatCommand::Stats) => Step::Report,
        Some(ChatCommand::Invalid(message)) => Step::Reject(message),
        None => Step::Query(line.to_string()),
    }
}

/// Prints the greeting shown before the first prompt.
pub fn print_banner(renderer: &mut dyn Renderer, model: &str) {
    renderer.print_info(&format!("Start chatting with {model}"));
    renderer.print_info(help_text());
}

/// Processes one line of input against the session.
pub async fn dispatch<S: CompletionService>(
    session: &mut ChatSession<S>,
    renderer: &mut dyn Renderer,
    line: &str,
) -> Control {
    match classify(line) {
        Step::Skip => {}
        Step::Terminate => {
            renderer.print_info("Goodbye!");
            return Control::Quit;
        }
        Step::Attach(path) => match session.attach(&path) {
            Ok(attachment) => {
                let message = format!("File attached: {}", attachment.filename());
                renderer.print_info(&message);
            }
            Err(err) => renderer.print_error(&format!("Error reading file: {err}")),
        },
        Step::List => renderer.print_info(&session.attachments().render_listing()),
        Step::Help => renderer.print_info(help_text()),
        Step::Report => print_stats(renderer, &session.stats()),
        Step::Reject(message) => renderer.print_error(&message),
        Step::Query(text) => match session.send(&text).await {
            Ok(completion) => {
                renderer.print_assistant(&completion.text);
                renderer.print_usage(&completion.usage, false);
            }
            Err(failure) => {
                renderer.print_error(&format!("Error getting response: {}", failure.error));
                renderer.print_usage(&failure.usage, true);
            }
        },
    }
    Control::Continue
}

/// Runs the loop until the user quits or input ends.
pub async fn run<S, R>(session: &mut ChatSession<S>, reader: &mut R, renderer: &mut dyn Renderer)
where
    S: CompletionService,
    R: LineReader + ?Sized,
{
    loop {
        match reader.read_line(PROMPT) {
            Ok(Input::Line(line)) => {
                if dispatch(session, renderer, &line).await == Control::Quit {
                    break;
                }
            }
            Ok(Input::Interrupted) => continue,
            Ok(Input::Eof) => {
                renderer.print_info("Goodbye!");
                break;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to read input line");
                renderer.print_error(&format!("Error reading input: {err}"));
            }
        }
    }
    tracing::info!(
        messages = session.message_count(),
        attachments = session.attachments().len(),
        "session ended"
    );
}

fn print_stats(renderer: &mut dyn Renderer, stats: &SessionStats) {
    let mut lines = vec![
        "Session Statistics:".to_string(),
        format!("  Model: {}", stats.model),
        format!("  Messages: {}", stats.message_count),
        format!("  Attachments: {}", stats.attachment_count),
        format!(
            "  Requests: {} ok / {} failed",
            stats.total_requests, stats.failed_requests
        ),
        format!(
            "  Total tokens: {} prompt / {} completion / {} total",
            stats.total_usage.prompt_tokens,
            stats.total_usage.completion_tokens,
            stats.total_usage.total_tokens
        ),
    ];
    if let Some(usage) = stats.last_turn_usage {
        lines.push(format!(
            "  Last turn tokens: {} prompt / {} completion / {} total",
            usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
        ));
    }
    renderer.print_info(&lines.join("\n"));
}
