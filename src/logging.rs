//! File logging.
//!
//! The TUI owns the terminal, so events go to `<dir>/weekplan.log`. The filter
//! comes from `WEEKPLAN_LOG` using `EnvFilter` syntax and defaults to `info`.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "WEEKPLAN_LOG";
pub const LOG_FILE: &str = "weekplan.log";

/// Path of the log file inside `dir`.
pub fn log_path(dir: &Path) -> PathBuf {
    dir.join(LOG_FILE)
}

/// Filter from `WEEKPLAN_LOG`, or `info` when unset or invalid.
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber writing to the log file in `dir`.
///
/// Calling it twice is harmless; the second subscriber is ignored.
pub fn init(dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dir)?;
    let file = OpenOptions::new().create(true).append(true).open(log_path(dir))?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init();
    Ok(())
}
