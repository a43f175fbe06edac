//! Splicing a time range into a day.
//!
//! The blocks overlapping `[start, end)` are always one contiguous run. The
//! run is replaced by at most three blocks: the part of the first block before
//! `start` (keeping its tasks), the new block, and the part of the last block
//! after `end` (keeping its tasks). Any block lying wholly inside the range
//! disappears together with its tasks. Callers that care can inspect
//! [`Splice::discarded`].

use log::debug;

use crate::model::block::Block;
use crate::model::partition::DayPartition;
use crate::model::range::TimeRange;
use crate::model::task::{Task, TaskIdMint, fresh_copies};

/// Result of a splice: the new day plus the tasks that fell inside the range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Splice {
    pub day: DayPartition,
    pub discarded: Vec<Task>,
}

/// Rewrite `day` so that `range` is exactly one block holding `new_tasks`.
pub fn splice_range(
    day: &DayPartition,
    range: TimeRange,
    new_tasks: Vec<Task>,
    ids: &mut TaskIdMint,
) -> DayPartition {
    splice(day, range, new_tasks, ids).day
}

/// Like [`splice_range`], also reporting the tasks that were dropped.
///
/// When a single block is cut on both sides, both remainders need its tasks;
/// the right-hand copies get new ids so no id appears twice in a day.
pub fn splice(
    day: &DayPartition,
    range: TimeRange,
    new_tasks: Vec<Task>,
    ids: &mut TaskIdMint,
) -> Splice {
    let blocks = day.blocks();
    let (start, end) = (range.start(), range.end());

    // First block reaching past `start`, then the first from there reaching `end`.
    // A valid partition ends at 1440 >= end, so both exist.
    let first = blocks.partition_point(|b| b.end() <= start);
    let mut last = first;
    while last + 1 < blocks.len() && blocks[last].end() < end {
        last += 1;
    }
    let (head, tail) = (&blocks[first], &blocks[last]);
    let keeps_left = head.start < start;
    let keeps_right = tail.end() > end;

    let mut result = Vec::with_capacity(blocks.len() + 2);
    result.extend_from_slice(&blocks[..first]);

    if keeps_left {
        result.push(Block::new(head.start, start - head.start, head.tasks.clone()));
    }
    result.push(Block::new(start, range.span(), new_tasks));
    if keeps_right {
        let tasks = if first == last && keeps_left {
            fresh_copies(&tail.tasks, ids)
        } else {
            tail.tasks.clone()
        };
        result.push(Block::new(end, tail.end() - end, tasks));
    }
    result.extend_from_slice(&blocks[last + 1..]);

    let mut discarded = Vec::new();
    for (index, block) in blocks.iter().enumerate().take(last + 1).skip(first) {
        let survives = (index == first && keeps_left) || (index == last && keeps_right);
        if !survives {
            discarded.extend(block.tasks.iter().cloned());
        }
    }
    if !discarded.is_empty() {
        debug!(
            "event=splice_discard range={} consumed_blocks={} tasks={}",
            range,
            last - first + 1,
            discarded.len()
        );
    }

    Splice {
        day: DayPartition::from_derived(result),
        discarded,
    }
}
