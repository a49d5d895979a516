//! Tracing setup for the consultant binary.
//!
//! One global subscriber writes plain-text lines to stdout and to the configured log file:
//! `2026-01-31 12:00:00  INFO consultant::service: message session_id=...`.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Local wall-clock timestamp at second precision.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Filter used when `RUST_LOG` is unset or invalid.
const DEFAULT_FILTER: &str = "info";

struct LocalSeconds;

impl FormatTime for LocalSeconds {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{} ", chrono::Local::now().format(TIMESTAMP_FORMAT))
    }
}

/// Installs the subscriber. Fails if the log file cannot be opened or a subscriber is
/// already set. Call after `.env` is loaded so `RUST_LOG` is visible.
pub fn init_tracing(log_file_path: &str) -> anyhow::Result<()> {
    let file = Arc::new(open_log_file(log_file_path)?);

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout.and(file))
        .with_timer(LocalSeconds)
        .with_target(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to set global subscriber: {}", e))
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Opens `path` for appending, creating it and its parent directory when missing.
fn open_log_file(path: &str) -> io::Result<File> {
    ensure_log_dir(path)?;
    OpenOptions::new().create(true).append(true).open(path)
}

/// Creates the parent directory of `log_file_path` if it has one.
pub fn ensure_log_dir(log_file_path: &str) -> io::Result<()> {
    match Path::new(log_file_path).parent() {
        Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir),
        _ => Ok(()),
    }
}
