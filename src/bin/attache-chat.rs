//! Interactive chat that lets you feed local files to the model.
//!
//! # Usage
//!
//! ```bash
//! export OPENAI_API_KEY=...
//! attache-chat
//!
//! # Pick a model or point at any OpenAI-compatible server
//! attache-chat --model gpt-4o-mini
//! attache-chat --base-url http://localhost:11434/v1 --model llama3.1:8b
//! ```
//!
//! # Commands
//!
//! - `/attach <filepath>` - Add a file to the conversation
//! - `/list` - Show attached files
//! - `/stats` - Show session statistics
//! - `/help` - Show available commands
//! - `/quit` - Exit the application

use std::process::ExitCode;

use arrrg::CommandLine;
use time::UtcOffset;

use attache::chat::{
    ChatArgs, ChatConfig, ChatSession, PlainTextRenderer, Renderer, RustylineReader, print_banner,
    run,
};
use attache::client::api_key_from_env;
use attache::logging::init_tracing;
use attache::{CompletionClient, Error};

fn main() -> ExitCode {
    let (args, _) = ChatArgs::from_command_line_relaxed("attache-chat [OPTIONS]");
    let config = ChatConfig::from(args);
    init_tracing(config.use_color);

    // Must be read before any other thread exists.
    let utc_offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);

    let mut renderer = PlainTextRenderer::with_color(config.use_color);
    match start(config, utc_offset, &mut renderer) {
        Ok(()) => ExitCode::SUCCESS,
        Err(Error::Config { message }) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
        Err(err) => {
            renderer.print_error(&err.to_string());
            ExitCode::FAILURE
        }
    }
}

fn start(
    config: ChatConfig,
    utc_offset: UtcOffset,
    renderer: &mut PlainTextRenderer,
) -> Result<(), Error> {
    let api_key = api_key_from_env()?;
    let client = CompletionClient::with_options(
        Some(api_key),
        Some(&config.base_url),
        Some(config.timeout),
    )?
    .with_max_tokens(config.max_tokens);
    let mut reader = RustylineReader::new()?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| Error::config(format!("cannot start async runtime: {err}")))?;

    let mut session = ChatSession::new(client, config).with_utc_offset(utc_offset);
    print_banner(renderer, session.model().as_str());
    runtime.block_on(run(&mut session, &mut reader, renderer));
    Ok(())
}
