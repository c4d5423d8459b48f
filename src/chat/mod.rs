//! Chat application module for interactive conversations with file context.
//!
//! This module provides the REPL chat interface built on top of the
//! attachment and conversation primitives. It supports:
//!
//! - Attaching local files (text inline, binary as base64) with `/attach`
//! - Listing attachments with `/list`
//! - Full-history chat turns against any [`CompletionService`](crate::CompletionService)
//! - Token usage reporting after every turn
//!
//! # Architecture
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`session`]: Session state and the per-transition operations
//! - [`commands`]: Slash command parsing
//! - [`render`]: Output rendering
//! - [`repl`]: The input loop and dispatch

mod commands;
mod config;
mod render;
mod repl;
mod session;

pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig};
pub use render::{BufferRenderer, PlainTextRenderer, Renderer, format_usage};
pub use repl::{
    Control, Input, LineReader, PROMPT, RustylineReader, Step, classify, dispatch, print_banner,
    run,
};
pub use session::{ChatSession, SessionStats};
