use serde::{Deserialize, Serialize};

use super::partition::{DEFAULT_BLOCK_SPAN, MINUTES_PER_DAY};

/// Configuration from dayplan/config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlannerConfig {
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduleConfig {
    /// Size of the head block produced by `split`, in minutes.
    /// Default: see src/cli/handlers/init.rs
    #[serde(default = "default_base_unit")]
    pub base_unit: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        ScheduleConfig {
            base_unit: default_base_unit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageConfig {
    /// Snapshot file stem. Bump it to start a fresh schedule without
    /// touching the old file.
    #[serde(default = "default_storage_key")]
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            key: default_storage_key(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    /// flexi_logger spec, e.g. "info" or "warn, dayplan::ops=debug"
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: default_log_level(),
        }
    }
}

fn default_base_unit() -> u32 {
    DEFAULT_BLOCK_SPAN
}

fn default_storage_key() -> String {
    "weekly-schedule-v1".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl PlannerConfig {
    /// Check values serde cannot express
    pub fn validate(&self) -> Result<(), String> {
        if self.schedule.base_unit == 0 || self.schedule.base_unit >= MINUTES_PER_DAY {
            return Err(format!(
                "schedule.base_unit must be between 1 and {}, got {}",
                MINUTES_PER_DAY - 1,
                self.schedule.base_unit
            ));
        }
        let key = self.storage.key.trim();
        if key.is_empty() {
            return Err("storage.key must not be empty".to_string());
        }
        if key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(format!(
                "storage.key '{}' must be a plain file name",
                self.storage.key
            ));
        }
        Ok(())
    }
}
