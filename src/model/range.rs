use std::fmt;

use super::block::Block;
use super::partition::MINUTES_PER_DAY;

/// Why a requested range cannot be spliced into a day
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    #[error("range must end after it starts ({start} >= {end})")]
    Empty { start: u32, end: u32 },
    #[error("range end {end} is past midnight (1440)")]
    PastMidnight { end: u32 },
}

/// A validated, non-empty, half-open `[start, end)` range within one day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    start: u32,
    end: u32,
}

impl TimeRange {
    pub fn new(start: u32, end: u32) -> Result<Self, RangeError> {
        if end <= start {
            return Err(RangeError::Empty { start, end });
        }
        if end > MINUTES_PER_DAY {
            return Err(RangeError::PastMidnight { end });
        }
        Ok(TimeRange { start, end })
    }

    pub fn from_span(start: u32, span: u32) -> Result<Self, RangeError> {
        TimeRange::new(start, start.saturating_add(span))
    }

    /// The bounds of a block taken from a valid partition
    pub(crate) fn of_block(block: &Block) -> Self {
        TimeRange {
            start: block.start,
            end: block.end(),
        }
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    pub fn span(&self) -> u32 {
        self.end - self.start
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}
