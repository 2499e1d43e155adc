// SPDX-License-Identifier: MIT

//! Logging setup, grounded on the daemon's own `setup_logging` (a file
//! appender behind `tracing_appender::non_blocking`, layered with an
//! `EnvFilter`-driven stderr layer so a bare `RUST_LOG` still works without a
//! log file configured).

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize global tracing. Returns a [`WorkerGuard`] that must be held
/// for the process lifetime when `log_path` is set, flushing buffered file
/// writes on drop.
pub fn init(log_path: Option<&Path>, debug: bool) -> std::io::Result<Option<WorkerGuard>> {
    let default_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match log_path {
        None => {
            tracing_subscriber::registry().with(filter).with(fmt::layer()).init();
            Ok(None)
        }
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file_name = path.file_name().unwrap_or_else(|| std::ffi::OsStr::new("ztp.log"));
            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer())
                .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
                .init();
            Ok(Some(guard))
        }
    }
}
