//! Logging and tracing initialization.
//!
//! Library crates only emit through `tracing`; installing a subscriber is
//! the host's job. The CLI installs one at startup, optionally teeing
//! output into a log file from the app configuration.

use std::fs::File;
use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Initialize the global tracing subscriber from a logging configuration.
///
/// `RUST_LOG` takes precedence over the configured level. When a log file
/// is configured but cannot be created, output falls back to stderr.
pub fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let log_file = config
        .file
        .as_ref()
        .and_then(|path| match File::create(path) {
            Ok(file) => Some(Arc::new(file)),
            Err(e) => {
                eprintln!("reframe: cannot open log file {}: {e}", path.display());
                None
            }
        });

    match (config.json, log_file) {
        (true, Some(file)) => install(
            fmt::Subscriber::builder()
                .with_env_filter(filter)
                .json()
                .with_writer(file)
                .finish(),
        ),
        (true, None) => install(
            fmt::Subscriber::builder()
                .with_env_filter(filter)
                .json()
                .finish(),
        ),
        (false, Some(file)) => install(
            fmt::Subscriber::builder()
                .with_env_filter(filter)
                .with_target(true)
                .with_ansi(false)
                .with_writer(file)
                .finish(),
        ),
        (false, None) => install(
            fmt::Subscriber::builder()
                .with_env_filter(filter)
                .with_target(true)
                .finish(),
        ),
    }
}

/// Initialize logging for a CLI invocation. The verbose flag lifts the
/// configured level to `debug`.
pub fn init_cli_logging(base: &LoggingConfig, verbose: bool) {
    let mut config = base.clone();
    if verbose {
        config.level = "debug".to_string();
    }
    init_logging(&config);
}

fn install(subscriber: impl tracing::Subscriber + Send + Sync + 'static) {
    tracing::subscriber::set_global_default(subscriber).ok();
}
