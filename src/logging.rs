//! Tracing subscriber setup.
//!
//! Filtering comes from `TB_LOG` (e.g. `TB_LOG=taskboard=debug`), default `warn`.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub const ENV_LOG: &str = "TB_LOG";

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(ENV_LOG).unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Log to stderr. Used by the plain subcommands.
pub fn init_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_writer(std::io::stderr)
        .try_init();
}

/// Log to a file, appending. Used by the dashboard, which owns the terminal.
/// Falls back to no logging if the file cannot be opened.
pub fn init_file(path: &Path) {
    let file = match OpenOptions::new().create(true).append(true).open(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Cannot open log file {}: {e}", path.display());
            return;
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
}
