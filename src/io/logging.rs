//! File logging for the `dp` binary.
//!
//! Lines go to `dayplan/logs/dayplan*.log` as `key=value` events, e.g.
//! `event=splice day=Monday range=[540, 600) tasks=1`. `RUST_LOG` overrides the
//! configured level. Nothing is printed to the terminal; user-facing messages
//! stay on stdout/stderr.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use flexi_logger::{Cleanup, Criterion, FileSpec, FlexiLoggerError, Logger, LoggerHandle, Naming};
use log::info;

const LOG_DIR: &str = "logs";
const LOG_FILE_BASENAME: &str = "dayplan";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 1024 * 1024;
const MAX_LOG_FILES: usize = 3;

static LOGGER: OnceLock<LoggerHandle> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("could not create log directory {path}: {source}")]
    Dir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not start logger: {0}")]
    Logger(#[from] FlexiLoggerError),
}

pub fn log_dir(planner_dir: &Path) -> PathBuf {
    planner_dir.join(LOG_DIR)
}

/// Start file logging under `planner_dir`. Later calls are no-ops.
pub fn init_logging(planner_dir: &Path, level: &str) -> Result<(), LoggingError> {
    if LOGGER.get().is_some() {
        return Ok(());
    }
    let dir = log_dir(planner_dir);
    std::fs::create_dir_all(&dir).map_err(|source| LoggingError::Dir {
        path: dir.clone(),
        source,
    })?;

    let handle = Logger::try_with_env_or_str(level)?
        .log_to_file(
            FileSpec::default()
                .directory(&dir)
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()?;
    // A racing initializer already owns the global logger; keep theirs.
    let _ = LOGGER.set(handle);

    info!(
        "event=cli_start version={} planner_dir={}",
        env!("CARGO_PKG_VERSION"),
        planner_dir.display()
    );
    Ok(())
}
