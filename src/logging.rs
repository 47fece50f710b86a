//! Logging setup shared by the trainer, the headless predictor and the UI.
//!
//! Each program writes to stderr and to its own file under `logs/`, named
//! `<program>_<timestamp>.log`. Only the newest [`MAX_LOG_FILES`] files per
//! program are kept, so one program's launches never evict another's logs.

use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
    sync::OnceLock,
};

use thiserror::Error;
use time::{
    OffsetDateTime, UtcOffset, format_description::FormatItem,
    format_description::well_known::Rfc3339, macros::format_description,
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, filter::LevelFilter, fmt, prelude::*, util::TryInitError,
};

use crate::app_dirs::{self, AppDirError};

/// Log files kept per program.
pub const MAX_LOG_FILES: usize = 10;

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error(transparent)]
    AppDir(#[from] AppDirError),
    #[error("Log file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to format log file timestamp: {0}")]
    Timestamp(#[from] time::error::Format),
    #[error("Failed to install tracing subscriber: {0}")]
    Install(#[from] TryInitError),
}

/// Install the global subscriber for `program` and return the log file path.
///
/// Only the first call in a process does anything. Callers report failures on
/// stderr and keep running without a log file.
pub fn init(program: &str) -> Result<Option<PathBuf>, LoggingError> {
    if LOG_GUARD.get().is_some() {
        return Ok(None);
    }
    let dir = app_dirs::logs_dir()?;
    let path = dir.join(log_file_name(program, now_local_or_utc())?);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|source| LoggingError::Io {
            path: path.clone(),
            source,
        })?;
    prune_old_logs(&dir, program, MAX_LOG_FILES)?;

    let (file_writer, guard) = tracing_appender::non_blocking(file);
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    tracing_subscriber::registry()
        .with(env_filter())
        .with(
            fmt::layer()
                .with_timer(fmt::time::OffsetTime::new(offset, Rfc3339))
                .with_writer(std::io::stderr),
        )
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_timer(fmt::time::OffsetTime::new(offset, Rfc3339))
                .with_writer(file_writer),
        )
        .try_init()?;
    let _ = LOG_GUARD.set(guard);

    tracing::info!(program, "Logging to {}", path.display());
    Ok(Some(path))
}

/// `RUST_LOG` directives on top of an `info` default.
fn env_filter() -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy()
}

fn log_file_name(program: &str, now: OffsetDateTime) -> Result<String, LoggingError> {
    const STAMP: &[FormatItem<'_>] =
        format_description!("[year]-[month]-[day]_[hour]-[minute]-[second]");
    Ok(format!("{program}_{}.log", now.format(STAMP)?))
}

/// Log files written by `program`, oldest first.
fn program_logs(dir: &Path, program: &str) -> Result<Vec<PathBuf>, LoggingError> {
    let prefix = format!("{program}_");
    let entries = fs::read_dir(dir).map_err(|source| LoggingError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut logs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(&prefix) && name.ends_with(".log"))
        })
        .collect();
    // Timestamps in the names sort chronologically.
    logs.sort();
    Ok(logs)
}

fn prune_old_logs(dir: &Path, program: &str, keep: usize) -> Result<(), LoggingError> {
    let logs = program_logs(dir, program)?;
    let excess = logs.len().saturating_sub(keep);
    for path in &logs[..excess] {
        fs::remove_file(path).map_err(|source| LoggingError::Io {
            path: path.clone(),
            source,
        })?;
    }
    Ok(())
}

fn now_local_or_utc() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}
