use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::Serialize;

use crate::model::block::Block;
use crate::model::partition::{PartitionViolation, partition_violations};
use crate::model::schedule::Day;

/// Structured result from `dp check`, suitable for --json output.
#[derive(Debug, Default, Serialize)]
pub struct CheckResult {
    pub valid: bool,
    pub errors: Vec<CheckError>,
    pub warnings: Vec<CheckWarning>,
}

/// A problem that makes the snapshot unloadable (load falls back to defaults)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum CheckError {
    /// The file is not a day-name → block-list JSON object
    #[serde(rename = "invalid_json")]
    InvalidJson { message: String },
    /// A top-level key is not a weekday name
    #[serde(rename = "unknown_day")]
    UnknownDay { name: String },
    /// A day's blocks do not partition the day
    #[serde(rename = "broken_partition")]
    BrokenPartition {
        day: String,
        violation: PartitionViolation,
    },
}

/// A non-critical issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum CheckWarning {
    /// Day absent from the snapshot; it loads as the default 24 hours
    #[serde(rename = "missing_day")]
    MissingDay { day: String },
    /// The same task id appears more than once
    #[serde(rename = "duplicate_task_id")]
    DuplicateTaskId { task_id: String, days: Vec<String> },
    /// Task with blank text
    #[serde(rename = "empty_task")]
    EmptyTask { day: String, task_id: String },
}

// ---------------------------------------------------------------------------
// Main check entry point
// ---------------------------------------------------------------------------

/// Validate raw snapshot text and return structured results.
///
/// This is a read-only operation. It looks at the file the way the loader
/// would, but reports every problem instead of falling back to defaults.
pub fn check_snapshot(text: &str) -> CheckResult {
    let mut result = CheckResult::default();

    let raw: IndexMap<String, Vec<Block>> = match serde_json::from_str(text) {
        Ok(raw) => raw,
        Err(e) => {
            result.errors.push(CheckError::InvalidJson {
                message: e.to_string(),
            });
            return result;
        }
    };

    let mut id_days: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for (name, blocks) in &raw {
        if serde_json::from_value::<Day>(serde_json::Value::String(name.clone())).is_err() {
            result.errors.push(CheckError::UnknownDay { name: name.clone() });
        }
        for violation in partition_violations(blocks) {
            result.errors.push(CheckError::BrokenPartition {
                day: name.clone(),
                violation,
            });
        }
        for task in blocks.iter().flat_map(|b| &b.tasks) {
            id_days
                .entry(task.id.as_str())
                .or_default()
                .push(name.clone());
            if task.text.trim().is_empty() {
                result.warnings.push(CheckWarning::EmptyTask {
                    day: name.clone(),
                    task_id: task.id.to_string(),
                });
            }
        }
    }

    for day in Day::ALL {
        if !raw.contains_key(day.name()) {
            result.warnings.push(CheckWarning::MissingDay {
                day: day.name().to_string(),
            });
        }
    }

    for (task_id, mut days) in id_days {
        if days.len() > 1 {
            days.dedup();
            result.warnings.push(CheckWarning::DuplicateTaskId {
                task_id: task_id.to_string(),
                days,
            });
        }
    }

    result.valid = result.errors.is_empty();
    result
}
