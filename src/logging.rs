use std::io;

use tracing_subscriber::EnvFilter;

/// Environment variable holding the tracing filter directives.
pub const LOG_ENV: &str = "ATTACHE_LOG";

/// Initialize tracing to stderr.
///
/// The filter comes from `ATTACHE_LOG` (same syntax as `RUST_LOG`) and
/// defaults to `warn` so diagnostics stay out of the conversation.
pub fn init_tracing(use_color: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(use_color)
        .with_target(true)
        .try_init();
    if let Err(err) = result {
        eprintln!("tracing already initialized: {err}");
    }
}
