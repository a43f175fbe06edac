pub mod time_range;

pub use time_range::{ClockRange, RangeParseError, parse_range};
