use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};

use super::partition::DayPartition;
use super::task::{TaskId, TaskIdMint};

/// Day of the week; the key of a weekly schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
            Day::Sunday => "Sunday",
        }
    }

    pub fn from_weekday(weekday: chrono::Weekday) -> Day {
        match weekday {
            chrono::Weekday::Mon => Day::Monday,
            chrono::Weekday::Tue => Day::Tuesday,
            chrono::Weekday::Wed => Day::Wednesday,
            chrono::Weekday::Thu => Day::Thursday,
            chrono::Weekday::Fri => Day::Friday,
            chrono::Weekday::Sat => Day::Saturday,
            chrono::Weekday::Sun => Day::Sunday,
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown day '{0}' (expected a weekday name like mon or monday)")]
pub struct UnknownDay(pub String);

impl FromStr for Day {
    type Err = UnknownDay;

    /// Accepts full or three-letter names in any case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Day::ALL
            .into_iter()
            .find(|day| {
                let name = day.name().to_ascii_lowercase();
                lower == name || (lower.len() == 3 && name.starts_with(&lower))
            })
            .ok_or_else(|| UnknownDay(s.to_string()))
    }
}

/// Persisted shape: day name to block list
pub type ScheduleSnapshot = IndexMap<Day, DayPartition>;

/// The whole week: one independent partition per day.
///
/// Like [`DayPartition`], a schedule is a value. Updates produce a new
/// schedule, so whatever holds the previous one never sees a half-applied
/// change. The schedule also owns the id mint for every task it contains.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "ScheduleSnapshot")]
pub struct WeeklySchedule {
    days: IndexMap<Day, DayPartition>,
    ids: TaskIdMint,
}

impl WeeklySchedule {
    pub fn day(&self, day: Day) -> &DayPartition {
        // Every constructor fills all seven days.
        &self.days[&day]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Day, &DayPartition)> {
        self.days.iter().map(|(d, p)| (*d, p))
    }

    pub fn ids(&self) -> &TaskIdMint {
        &self.ids
    }

    pub fn task_ids(&self) -> impl Iterator<Item = &TaskId> {
        self.days.values().flat_map(|p| p.task_ids())
    }

    /// Derive a new schedule in which `day` is replaced by what `f` builds.
    ///
    /// `f` gets the current partition and a mint for any new task ids.
    pub fn update_day(
        &self,
        day: Day,
        f: impl FnOnce(&DayPartition, &mut TaskIdMint) -> DayPartition,
    ) -> WeeklySchedule {
        let mut ids = self.ids.clone();
        let replaced = f(self.day(day), &mut ids);
        let mut days = self.days.clone();
        days.insert(day, replaced);
        WeeklySchedule { days, ids }
    }

    /// Derive a new schedule by rebuilding every day in turn, Monday first
    pub fn update_all_days(
        &self,
        mut f: impl FnMut(Day, &DayPartition, &mut TaskIdMint) -> DayPartition,
    ) -> WeeklySchedule {
        let mut ids = self.ids.clone();
        let days = self
            .days
            .iter()
            .map(|(day, partition)| (*day, f(*day, partition, &mut ids)))
            .collect();
        WeeklySchedule { days, ids }
    }

    /// Put `day` back to twenty-four empty hours. All of its tasks are lost.
    pub fn reset_day(&self, day: Day) -> WeeklySchedule {
        self.update_day(day, |_, _| DayPartition::default())
    }
}

impl Default for WeeklySchedule {
    fn default() -> Self {
        WeeklySchedule::from(ScheduleSnapshot::new())
    }
}

impl From<ScheduleSnapshot> for WeeklySchedule {
    /// Days missing from the snapshot start out with the default partition
    fn from(mut snapshot: ScheduleSnapshot) -> Self {
        let days: IndexMap<Day, DayPartition> = Day::ALL
            .into_iter()
            .map(|day| (day, snapshot.swap_remove(&day).unwrap_or_default()))
            .collect();
        let ids = TaskIdMint::seeded(days.values().flat_map(|p| p.task_ids()));
        WeeklySchedule { days, ids }
    }
}

impl Serialize for WeeklySchedule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.days.serialize(serializer)
    }
}
