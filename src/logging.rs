//! Logging configuration for searchrag
//!
//! Logs go to stderr and to a daily rolling file under `logs/`. Standard output
//! is reserved for the retrieval trace and the final answer.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Registry;

use crate::Result;

const LOGS_DIR: &str = "logs";
const LOG_FILE_PREFIX: &str = "searchrag.log";

/// Build the filter directive for a level, e.g. `warn,searchrag=debug`
#[must_use]
pub fn filter_directive(level: &str) -> String {
    format!("warn,searchrag={level}")
}

/// Initialize logging with configuration
pub fn init_logging_with_config(config: &crate::config::AppConfig) -> Result<WorkerGuard> {
    init_logging_with_level(&config.logging.level)
}

/// Initialize logging with custom log level.
///
/// `RUST_LOG` takes precedence over `level` when set.
/// The returned guard must be held for the life of the process so the file
/// writer flushes.
pub fn init_logging_with_level(level: &str) -> Result<WorkerGuard> {
    let logs_dir = Path::new(LOGS_DIR);
    if !logs_dir.exists() {
        std::fs::create_dir_all(logs_dir)?;
    }

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_directive(level)));

    let file_appender = tracing_appender::rolling::daily(LOGS_DIR, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr);

    let file_layer = fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(non_blocking)
        .with_ansi(false); // No colors in file

    Registry::default()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| crate::SearchRagError::ConfigError(format!("Logging already initialized: {e}")))?;

    tracing::debug!("Logging initialized with level: {}", level);
    tracing::debug!("Log files will be saved to: {}/{}.YYYY-MM-DD", LOGS_DIR, LOG_FILE_PREFIX);

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive() {
        assert_eq!(filter_directive("debug"), "warn,searchrag=debug");
        assert!(EnvFilter::try_new(filter_directive("info")).is_ok());
    }
}
