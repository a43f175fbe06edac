use crate::model::block::Block;
use crate::model::partition::DayPartition;
use crate::model::schedule::{Day, WeeklySchedule};

/// Error type for addressing a block by day and index
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("{day} has no block {index} (it has {len})")]
    BlockOutOfRange { day: Day, index: usize, len: usize },
}

/// Resolve a block index on a day, for callers that want to report misses
pub fn require_block(
    schedule: &WeeklySchedule,
    day: Day,
    index: usize,
) -> Result<&Block, ScheduleError> {
    let partition = schedule.day(day);
    partition.get(index).ok_or(ScheduleError::BlockOutOfRange {
        day,
        index,
        len: partition.len(),
    })
}

/// Merge block `index` with the block after it.
///
/// The merged block spans both and carries the left block's tasks followed by
/// the right block's. Merging the last block (or an index past the end) is a
/// no-op.
pub fn merge_adjacent(day: &DayPartition, index: usize) -> DayPartition {
    let blocks = day.blocks();
    if index + 1 >= blocks.len() {
        return day.clone();
    }
    let (left, right) = (&blocks[index], &blocks[index + 1]);
    if left.end() != right.start {
        return day.clone();
    }

    let mut tasks = left.tasks.clone();
    tasks.extend(right.tasks.iter().cloned());
    let merged = Block::new(left.start, left.span + right.span, tasks);

    let mut result = Vec::with_capacity(blocks.len() - 1);
    result.extend_from_slice(&blocks[..index]);
    result.push(merged);
    result.extend_from_slice(&blocks[index + 2..]);
    DayPartition::from_derived(result)
}

/// Split a block longer than `base_unit` into a `base_unit` head and the rest.
///
/// Every task stays on the head; the remainder starts empty. Blocks at or
/// below the base unit (and out-of-range indices) are left alone.
pub fn split_slot(day: &DayPartition, index: usize, base_unit: u32) -> DayPartition {
    let Some(block) = day.get(index) else {
        return day.clone();
    };
    if base_unit == 0 || block.span <= base_unit {
        return day.clone();
    }

    let head = Block::new(block.start, base_unit, block.tasks.clone());
    let rest = Block::empty(block.start + base_unit, block.span - base_unit);

    let blocks = day.blocks();
    let mut result = Vec::with_capacity(blocks.len() + 1);
    result.extend_from_slice(&blocks[..index]);
    result.push(head);
    result.push(rest);
    result.extend_from_slice(&blocks[index + 1..]);
    DayPartition::from_derived(result)
}
