//! Output rendering for the chat application.
//!
//! The session loop talks to a [`Renderer`] rather than to stdout so that the
//! loop can be driven and inspected without a terminal.

use std::io::{self, Stdout, Write};

use crate::types::Usage;

/// ANSI escape code for dim text (used for usage lines).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code for bold text (used for the assistant label).
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code for cyan text (used for informational messages).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// Trait for rendering chat output.
pub trait Renderer: Send {
    /// Print the assistant's reply.
    fn print_assistant(&mut self, text: &str);

    /// Print token usage for a turn.
    ///
    /// `failed` marks usage reported for a turn that produced no reply.
    fn print_usage(&mut self, usage: &Usage, failed: bool);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);
}

/// Formats the usage line printed after every chat turn.
pub fn format_usage(usage: &Usage, failed: bool) -> String {
    let label = if failed {
        "Token usage (in error case)"
    } else {
        "Token usage"
    };
    format!(
        "|-> {label} - Prompt: {}, Completion: {}, Total: {}",
        usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
    )
}

/// Plain text renderer with optional ANSI styling.
pub struct PlainTextRenderer {
    stdout: Stdout,
    use_color: bool,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            stdout: io::stdout(),
            use_color,
        }
    }

    /// Returns true if ANSI styling is enabled.
    pub fn use_color(&self) -> bool {
        self.use_color
    }

    fn flush(&mut self) {
        let _ = self.stdout.flush();
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PlainTextRenderer {
    fn print_assistant(&mut self, text: &str) {
        if self.use_color {
            println!("\n{ANSI_BOLD}Assistant:{ANSI_RESET} {text}");
        } else {
            println!("\nAssistant: {text}");
        }
        self.flush();
    }

    fn print_usage(&mut self, usage: &Usage, failed: bool) {
        let line = format_usage(usage, failed);
        if self.use_color {
            println!("\n{ANSI_DIM}{line}{ANSI_RESET}");
        } else {
            println!("\n{line}");
        }
        self.flush();
    }

    fn print_error(&mut self, error: &str) {
        self.flush();
        if self.use_color {
            eprintln!("{ANSI_RED}{error}{ANSI_RESET}");
        } else {
            eprintln!("{error}");
        }
    }

    fn print_info(&mut self, info: &str) {
        if self.use_color {
            println!("{ANSI_CYAN}{info}{ANSI_RESET}");
        } else {
            println!("{info}");
        }
        self.flush();
    }
}

/// A renderer that keeps every line in memory.
///
/// Errors are prefixed with `error: ` so they can be told apart from other
/// output.
#[derive(Debug, Default)]
pub struct BufferRenderer {
    lines: Vec<String>,
}

impl BufferRenderer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything rendered so far, one entry per call.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Returns true if any rendered line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|line| line.contains(needle))
    }
}

impl Renderer for BufferRenderer {
    fn print_assistant(&mut self, text: &str) {
        self.lines.push(format!("Assistant: {text}"));
    }

    fn print_usage(&mut self, usage: &Usage, failed: bool) {
        self.lines.push(format_usage(usage, failed));
    }

    fn print_error(&mut self, error: &str) {
        self.lines.push(format!("error: {error}"));
    }

    fn print_info(&mut self, info: &str) {
        self.lines.push(info.to_string());
    }
}
