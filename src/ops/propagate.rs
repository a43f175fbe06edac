use log::info;

use crate::model::range::TimeRange;
use crate::model::schedule::{Day, WeeklySchedule};
use crate::model::task::fresh_copies;
use crate::ops::slot_ops::{ScheduleError, require_block};
use crate::ops::splice::splice_range;

/// How the source block's tasks land on each day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropagateMode {
    /// The range holds only copies of the source tasks
    Replace,
    /// Copies are added after whatever tasks a day already had at exactly
    /// that range
    Append,
}

/// Copy one block's range and tasks onto every day of the week.
///
/// Each day, the source day included, gets its own copies of the source
/// tasks with newly minted ids. In [`PropagateMode::Append`] that leaves the
/// source block holding its originals followed by their copies.
pub fn apply_block_to_all_days(
    schedule: &WeeklySchedule,
    source_day: Day,
    block_index: usize,
    mode: PropagateMode,
) -> Result<WeeklySchedule, ScheduleError> {
    let block = require_block(schedule, source_day, block_index)?;
    let range = TimeRange::of_block(block);
    let source_tasks = block.tasks.clone();

    info!(
        "event=propagate source={} range={} mode={:?} tasks={}",
        source_day,
        range,
        mode,
        source_tasks.len()
    );

    let updated = schedule.update_all_days(|_, partition, ids| match mode {
        PropagateMode::Replace => {
            let copies = fresh_copies(&source_tasks, ids);
            splice_range(partition, range, copies, ids)
        }
        PropagateMode::Append => {
            let mut tasks = partition
                .find_exact(range)
                .and_then(|i| partition.get(i))
                .map(|b| b.tasks.clone())
                .unwrap_or_default();
            tasks.extend(fresh_copies(&source_tasks, ids));
            splice_range(partition, range, tasks, ids)
        }
    });
    Ok(updated)
}
