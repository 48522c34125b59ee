//! Tracing setup for the server and its helper tools.
//!
//! Events go to stdout through a compact formatter. When a log file is configured they are
//! also appended to it through a non-blocking writer, without ANSI colours and with targets
//! so store and HTTP events can be told apart. `RUST_LOG` filters both (default `info`).
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the global subscriber, mirroring events to `log_file` when given.
///
/// A log file that cannot be prepared is reported on stderr and skipped; stdout logging is
/// always installed.
pub fn init_tracing(log_file: Option<&Path>) {
    let file_writer = log_file.and_then(|path| match file_writer(path) {
        Ok(writer) => Some(writer),
        Err(err) => {
            eprintln!("Failed to prepare log file {}: {err}", path.display());
            None
        }
    });

    let file_layer = file_writer.map(|writer| {
        fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_ansi(false)
            .compact()
    });

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_target(false).compact())
        .with(file_layer)
        .init();
}

fn file_writer(path: &Path) -> std::io::Result<NonBlocking> {
    let (directory, file_name) = split_log_path(path)?;
    std::fs::create_dir_all(&directory)?;
    let appender = tracing_appender::rolling::never(directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = LOG_GUARD.set(guard);
    Ok(writer)
}

/// Split a log path into the directory to create and the file name to append to.
fn split_log_path(path: &Path) -> std::io::Result<(PathBuf, PathBuf)> {
    let file_name = path.file_name().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("log path {} has no file name", path.display()),
        )
    })?;
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((directory, PathBuf::from(file_name)))
}
