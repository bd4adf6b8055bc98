use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::Path;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::{self, WorkerGuard};
use tracing_subscriber::EnvFilter;

/// Keeps the non-blocking log worker alive for the lifetime of the binary.
pub struct LoggingGuard {
    _worker: Option<WorkerGuard>,
}

/// Install the global subscriber: stderr by default (the report owns
/// stdout), or a non-blocking file writer when a path is given.
pub fn init_logging(log_file: Option<&Path>, level: LevelFilter) -> Result<LoggingGuard> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    match log_file {
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(true)
                .init();
            Ok(LoggingGuard { _worker: None })
        }
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create log directory {parent:?}"))?;
            }

            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {path:?}"))?;

            let (writer, guard) = non_blocking::NonBlockingBuilder::default().finish(file);

            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .init();

            Ok(LoggingGuard {
                _worker: Some(guard),
            })
        }
    }
}
