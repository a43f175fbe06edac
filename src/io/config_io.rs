use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::io::planner_io::PlannerError;
use crate::model::config::PlannerConfig;

pub fn config_path(planner_dir: &Path) -> PathBuf {
    planner_dir.join("config.toml")
}

/// Read dayplan/config.toml. A missing file means all defaults; a malformed
/// or out-of-range one is an error, since the user wrote it.
pub fn read_config(planner_dir: &Path) -> Result<PlannerConfig, PlannerError> {
    let path = config_path(planner_dir);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(PlannerConfig::default()),
        Err(source) => return Err(PlannerError::ReadError { path, source }),
    };
    let config: PlannerConfig = toml::from_str(&text)?;
    config.validate().map_err(PlannerError::InvalidConfig)?;
    Ok(config)
}
