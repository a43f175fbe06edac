use serde::{Deserialize, Serialize};

use super::block::Block;
use super::range::TimeRange;
use super::task::TaskId;

/// Minutes in one day; every partition covers exactly `[0, MINUTES_PER_DAY)`
pub const MINUTES_PER_DAY: u32 = 1440;

/// Span of each block in a freshly created day
pub const DEFAULT_BLOCK_SPAN: u32 = 60;

/// One broken partition invariant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PartitionViolation {
    #[error("day has no blocks")]
    Empty,
    #[error("first block starts at {start}, not 0")]
    BadStart { start: u32 },
    #[error("last block ends at {end}, not 1440")]
    BadEnd { end: u32 },
    #[error("block {index} has zero span")]
    ZeroSpan { index: usize },
    #[error("block {index} starts before block {prev}")]
    Unsorted { index: usize, prev: usize },
    #[error("gap between block {index} (ends {end}) and the next (starts {next_start})")]
    Gap {
        index: usize,
        end: u32,
        next_start: u32,
    },
    #[error("block {index} (ends {end}) overlaps the next (starts {next_start})")]
    Overlap {
        index: usize,
        end: u32,
        next_start: u32,
    },
}

/// Returned when a block list does not partition the day
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("blocks do not partition the day: {}", join_violations(.0))]
pub struct InvalidPartition(pub Vec<PartitionViolation>);

fn join_violations(violations: &[PartitionViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// List every invariant the given blocks break (empty when they partition the day)
pub fn partition_violations(blocks: &[Block]) -> Vec<PartitionViolation> {
    let mut violations = Vec::new();
    let (Some(first), Some(last)) = (blocks.first(), blocks.last()) else {
        violations.push(PartitionViolation::Empty);
        return violations;
    };

    if first.start != 0 {
        violations.push(PartitionViolation::BadStart { start: first.start });
    }
    for (index, block) in blocks.iter().enumerate() {
        if block.span == 0 {
            violations.push(PartitionViolation::ZeroSpan { index });
        }
    }
    for (index, pair) in blocks.windows(2).enumerate() {
        let (cur, next) = (&pair[0], &pair[1]);
        if next.start < cur.start {
            violations.push(PartitionViolation::Unsorted {
                index: index + 1,
                prev: index,
            });
        } else if cur.end() < next.start {
            violations.push(PartitionViolation::Gap {
                index,
                end: cur.end(),
                next_start: next.start,
            });
        } else if cur.end() > next.start {
            violations.push(PartitionViolation::Overlap {
                index,
                end: cur.end(),
                next_start: next.start,
            });
        }
    }
    if last.end() != MINUTES_PER_DAY {
        violations.push(PartitionViolation::BadEnd { end: last.end() });
    }
    violations
}

/// One day as an ordered, gapless, non-overlapping run of blocks covering
/// `[0, 1440)`.
///
/// Values are immutable: every operation that changes the shape of the day
/// builds a new partition. The only ways in are [`DayPartition::default`] and
/// the validating [`DayPartition::from_blocks`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Block>", into = "Vec<Block>")]
pub struct DayPartition {
    blocks: Vec<Block>,
}

impl DayPartition {
    /// Validate `blocks` and wrap them
    pub fn from_blocks(blocks: Vec<Block>) -> Result<Self, InvalidPartition> {
        let violations = partition_violations(&blocks);
        if violations.is_empty() {
            Ok(DayPartition { blocks })
        } else {
            Err(InvalidPartition(violations))
        }
    }

    /// Wrap blocks produced by an invariant-preserving operation
    pub(crate) fn from_derived(blocks: Vec<Block>) -> Self {
        debug_assert!(
            partition_violations(&blocks).is_empty(),
            "derived blocks break the partition: {:?}",
            partition_violations(&blocks)
        );
        DayPartition { blocks }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    /// True when all partition invariants hold
    pub fn covers(&self) -> bool {
        partition_violations(&self.blocks).is_empty()
    }

    /// The block containing `minute`, with its index
    pub fn block_at(&self, minute: u32) -> Option<(usize, &Block)> {
        let index = self.blocks.partition_point(|b| b.end() <= minute);
        self.blocks
            .get(index)
            .filter(|b| b.contains_minute(minute))
            .map(|b| (index, b))
    }

    /// Index of the block whose bounds are exactly `range`
    pub fn find_exact(&self, range: TimeRange) -> Option<usize> {
        self.blocks
            .iter()
            .position(|b| b.start == range.start() && b.end() == range.end())
    }

    /// Replace the tasks of block `index`, keeping its bounds.
    ///
    /// `f` receives the current block; only the task list of the block it
    /// returns is used. Returns `None` if `index` is out of range.
    pub fn map_block_tasks(&self, index: usize, f: impl FnOnce(&Block) -> Block) -> Option<Self> {
        let current = self.blocks.get(index)?;
        let replaced = current.with_tasks(f(current).tasks);
        let mut blocks = self.blocks.clone();
        blocks[index] = replaced;
        Some(DayPartition::from_derived(blocks))
    }

    pub fn task_ids(&self) -> impl Iterator<Item = &TaskId> {
        self.blocks.iter().flat_map(|b| b.tasks.iter().map(|t| &t.id))
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }
}

impl Default for DayPartition {
    /// Twenty-four empty one-hour blocks
    fn default() -> Self {
        let blocks = (0..MINUTES_PER_DAY / DEFAULT_BLOCK_SPAN)
            .map(|h| Block::empty(h * DEFAULT_BLOCK_SPAN, DEFAULT_BLOCK_SPAN))
            .collect();
        DayPartition::from_derived(blocks)
    }
}

impl TryFrom<Vec<Block>> for DayPartition {
    type Error = InvalidPartition;

    fn try_from(blocks: Vec<Block>) -> Result<Self, Self::Error> {
        DayPartition::from_blocks(blocks)
    }
}

impl From<DayPartition> for Vec<Block> {
    fn from(day: DayPartition) -> Self {
        day.into_blocks()
    }
}
