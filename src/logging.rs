use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::{self, WorkerGuard};
use tracing_subscriber::EnvFilter;

/// Where log output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stdout,
    File(PathBuf),
}

/// Keeps the non-blocking file writer flushing until dropped.
pub struct LoggingGuard {
    _worker: Option<WorkerGuard>,
}

pub fn init_logging(target: &LogTarget, level: LevelFilter) -> Result<LoggingGuard> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    match target {
        LogTarget::Stdout => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(true)
                .with_thread_ids(true)
                .try_init()
                .map_err(|e| anyhow::anyhow!("{e}"))
                .context("Failed to install stdout subscriber")?;
            Ok(LoggingGuard { _worker: None })
        }
        LogTarget::File(file_path) => {
            if let Some(parent) = file_path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create log directory {parent:?}"))?;
            }

            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(file_path)
                .with_context(|| format!("Failed to open log file {file_path:?}"))?;

            let (writer, guard) = non_blocking::NonBlockingBuilder::default().finish(file);

            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .try_init()
                .map_err(|e| anyhow::anyhow!("{e}"))
                .context("Failed to install file subscriber")?;

            Ok(LoggingGuard {
                _worker: Some(guard),
            })
        }
    }
}
