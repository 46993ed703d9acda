//! Logging setup.
//!
//! Installs a `tracing` subscriber writing to a daily-rolling file in the
//! configured log directory, plus warnings and errors on stderr. `RUST_LOG`
//! overrides the configured level.

use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;
use time::macros::format_description;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

pub use tracing_appender::non_blocking::WorkerGuard;

/// File name prefix of the rolling log.
pub const LOG_FILE_PREFIX: &str = "roadpilot.log";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to create log directory: {0}")]
    Io(#[from] io::Error),

    #[error("invalid log filter '{0}'")]
    Filter(String),

    #[error("logging already initialized: {0}")]
    AlreadyInitialized(String),
}

/// Builds the filter: `RUST_LOG` if set, else `default_level`.
pub fn build_filter(default_level: &str) -> Result<EnvFilter, LoggingError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(default_level)
            .map_err(|_| LoggingError::Filter(default_level.to_string())),
    }
}

/// Initializes global logging. Keep the returned guard alive for the life
/// of the process; dropping it flushes and stops the file writer.
pub fn init_logging(directory: &Path, default_level: &str) -> Result<WorkerGuard, LoggingError> {
    fs::create_dir_all(directory)?;

    let filter = build_filter(default_level)?;
    let appender = tracing_appender::rolling::daily(directory, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let timer = LocalTime::new(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]"
    ));

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_timer(timer.clone())
        .with_target(true);

    let stderr_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_timer(timer)
        .with_target(false)
        .with_filter(LevelFilter::WARN);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

    Ok(guard)
}
