//! Tracing subscriber setup for the `suggestions` binary.
//!
//! Filter priority: `SUGGESTIONS_LOG`, then `RUST_LOG`, then the `-v` flag
//! (debug) or the default level (warn). Output goes to stderr so stdout stays
//! free for the suggestion list.

use tracing::Level;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "SUGGESTIONS_LOG";

pub fn default_level(verbose: bool) -> Level {
    if verbose {
        Level::DEBUG
    } else {
        Level::WARN
    }
}

/// Build the filter from the environment, falling back to the CLI level.
pub fn build_env_filter(verbose: bool) -> EnvFilter {
    for var in [LOG_ENV, "RUST_LOG"] {
        if let Ok(directives) = std::env::var(var) {
            if let Ok(filter) = EnvFilter::try_new(&directives) {
                return filter;
            }
        }
    }
    EnvFilter::new(default_level(verbose).as_str().to_ascii_lowercase())
}

/// Install the global subscriber. A second call is a no-op.
pub fn init(verbose: bool) {
    let stderr_is_tty = std::io::IsTerminal::is_terminal(&std::io::stderr());
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(stderr_is_tty)
        .with_target(true);

    let _ = tracing_subscriber::registry()
        .with(build_env_filter(verbose))
        .with(fmt_layer)
        .try_init();
}
