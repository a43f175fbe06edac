use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::io::config_io::read_config;
use crate::io::lock::LockError;
use crate::io::recovery::{RecoveryCategory, RecoveryEntry, atomic_write, log_recovery};
use crate::model::planner::Planner;
use crate::model::schedule::WeeklySchedule;

/// Name of the directory that marks a planner root
pub const PLANNER_DIR: &str = "dayplan";

/// Error type for planner I/O operations
#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    #[error("not a dayplan directory: no dayplan/ found (run `dp init`)")]
    NotAPlanner,
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("invalid config.toml: {0}")]
    InvalidConfig(String),
    #[error("could not serialize schedule: {0}")]
    SnapshotSerialize(#[from] serde_json::Error),
    #[error(transparent)]
    Lock(#[from] LockError),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Walk up from `start` looking for a `dayplan/` directory. Returns the
/// directory that contains it.
pub fn discover_planner(start: &Path) -> Result<PathBuf, PlannerError> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(PLANNER_DIR).is_dir() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(PlannerError::NotAPlanner);
        }
    }
}

/// Load config and schedule for the planner rooted at `root`.
pub fn load_planner(root: &Path) -> Result<Planner, PlannerError> {
    let planner_dir = root.join(PLANNER_DIR);
    if !planner_dir.is_dir() {
        return Err(PlannerError::NotAPlanner);
    }
    let config = read_config(&planner_dir)?;
    let schedule = load_schedule(&planner_dir, &config.storage.key)?;
    Ok(Planner {
        root: root.to_path_buf(),
        planner_dir,
        config,
        schedule,
    })
}

pub fn snapshot_path(planner_dir: &Path, key: &str) -> PathBuf {
    planner_dir.join(format!("{key}.json"))
}

/// Read the stored week.
///
/// A missing file yields the default week. So does a file that is not a
/// valid snapshot, but its text is kept in the recovery log first, since the
/// next save will overwrite it.
pub fn load_schedule(planner_dir: &Path, key: &str) -> Result<WeeklySchedule, PlannerError> {
    let path = snapshot_path(planner_dir, key);
    let bytes = match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!("event=schedule_load status=missing path={}", path.display());
            return Ok(WeeklySchedule::default());
        }
        Err(source) => return Err(PlannerError::ReadError { path, source }),
    };

    let parsed = match String::from_utf8(bytes) {
        Ok(text) => serde_json::from_str::<WeeklySchedule>(&text)
            .map_err(|e| (e.to_string(), text)),
        Err(e) => {
            let text = String::from_utf8_lossy(e.as_bytes()).into_owned();
            Err((e.utf8_error().to_string(), text))
        }
    };

    match parsed {
        Ok(schedule) => Ok(schedule),
        Err((error, text)) => {
            warn!(
                "event=schedule_load status=corrupt path={} error={}",
                path.display(),
                error
            );
            log_recovery(
                planner_dir,
                RecoveryEntry::now(RecoveryCategory::Snapshot, "unreadable schedule replaced")
                    .field("Source", format!("{key}.json"))
                    .field("Error", error)
                    .body(text),
            );
            Ok(WeeklySchedule::default())
        }
    }
}

/// Write the week to `<key>.json`. On failure the serialized snapshot goes
/// to the recovery log so the change is not lost.
pub fn save_schedule(
    planner_dir: &Path,
    key: &str,
    schedule: &WeeklySchedule,
) -> Result<(), PlannerError> {
    let path = snapshot_path(planner_dir, key);
    let mut content = serde_json::to_string_pretty(schedule)?;
    content.push('\n');
    if let Err(source) = atomic_write(&path, content.as_bytes()) {
        warn!(
            "event=schedule_save status=error path={} error={}",
            path.display(),
            source
        );
        log_recovery(
            planner_dir,
            RecoveryEntry::now(RecoveryCategory::Write, "schedule write failed")
                .field("Target", format!("{key}.json"))
                .field("Error", source.to_string())
                .body(content),
        );
        return Err(PlannerError::WriteError { path, source });
    }
    Ok(())
}
