use std::path::PathBuf;

use super::config::PlannerConfig;
use super::schedule::WeeklySchedule;

/// A fully loaded planner directory
#[derive(Debug)]
pub struct Planner {
    /// Directory holding `dayplan/`
    pub root: PathBuf,
    /// Path to the `dayplan/` directory
    pub planner_dir: PathBuf,
    /// Parsed config.toml (defaults if absent)
    pub config: PlannerConfig,
    /// The current week
    pub schedule: WeeklySchedule,
}
