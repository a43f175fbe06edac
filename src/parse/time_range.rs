use std::sync::LazyLock;

use regex::Regex;

use crate::model::range::{RangeError, TimeRange};

/// Two clock times separated by `-`, `–`, `~` or `to`, each with an optional am/pm
static RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?P<from>[0-9]{1,4}(?::[0-9]{1,2})?)\s*(?P<from_ampm>am|pm)?\s*(?:-|–|~|to)\s*(?P<to>[0-9]{1,4}(?::[0-9]{1,2})?)\s*(?P<to_ampm>am|pm)?\s*$",
    )
    .expect("time range pattern is valid")
});

/// Error type for free-text time ranges
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeParseError {
    #[error("could not read '{0}' as a time range (try 9-10:30 or 9am to 5pm)")]
    Unrecognized(String),
    #[error("'{0}' is not a clock time")]
    BadTime(String),
}

/// Start and end minute-of-day read from text, not yet checked for order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockRange {
    pub start_minute: u32,
    pub end_minute: u32,
}

impl ClockRange {
    /// Require the end to come after the start
    pub fn to_time_range(self) -> Result<TimeRange, RangeError> {
        TimeRange::new(self.start_minute, self.end_minute)
    }
}

/// Parse text like `9-10`, `9:30 – 11`, `930~1100`, `1pm to 2:15pm`.
///
/// Each side is `H`, `H:MM`, `HMM` or `HHMM` in ASCII digits, optionally
/// followed by am/pm.
/// Hours clamp to 0..=23 and minutes to 0..=59, so the latest reachable time
/// is 23:59.
pub fn parse_range(text: &str) -> Result<ClockRange, RangeParseError> {
    let caps = RANGE_RE
        .captures(text)
        .ok_or_else(|| RangeParseError::Unrecognized(text.trim().to_string()))?;
    let side = |name: &str, ampm: &str| {
        parse_clock(
            &caps[name],
            caps.name(ampm).map(|m| m.as_str().to_ascii_lowercase()).as_deref(),
        )
    };
    Ok(ClockRange {
        start_minute: side("from", "from_ampm")?,
        end_minute: side("to", "to_ampm")?,
    })
}

/// Parse one side of a range into minute-of-day
fn parse_clock(digits: &str, ampm: Option<&str>) -> Result<u32, RangeParseError> {
    let bad = || RangeParseError::BadTime(digits.to_string());
    let (hour_text, minute_text) = match digits.split_once(':') {
        Some((h, m)) if h.len() <= 2 => (h, m),
        Some(_) => return Err(bad()),
        None if digits.len() <= 2 => (digits, "0"),
        None => digits.split_at(digits.len() - 2),
    };
    let mut hour: u32 = hour_text.parse().map_err(|_| bad())?;
    let minute: u32 = minute_text.parse().map_err(|_| bad())?;

    match ampm {
        Some("pm") if hour < 12 => hour += 12,
        Some("am") if hour == 12 => hour = 0,
        _ => {}
    }

    Ok(hour.min(23) * 60 + minute.min(59))
}
