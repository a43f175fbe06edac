use std::ops::Range;

use regex::Regex;

use crate::model::schedule::{Day, WeeklySchedule};
use crate::model::task::TaskId;

/// A task whose text matched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub day: Day,
    pub block_index: usize,
    pub task_id: TaskId,
    pub spans: Vec<Range<usize>>,
}

/// Collect all non-overlapping match byte-ranges for a regex in the given text.
fn find_matches(re: &Regex, text: &str) -> Vec<Range<usize>> {
    re.find_iter(text).map(|m| m.start()..m.end()).collect()
}

/// Search task texts across the week, Monday first, in block order.
///
/// If `day_filter` is `Some`, only that day is searched.
pub fn search_tasks(schedule: &WeeklySchedule, re: &Regex, day_filter: Option<Day>) -> Vec<SearchHit> {
    let mut hits = Vec::new();
    for (day, partition) in schedule.iter() {
        if day_filter.is_some_and(|d| d != day) {
            continue;
        }
        for (block_index, block) in partition.blocks().iter().enumerate() {
            for task in &block.tasks {
                let spans = find_matches(re, &task.text);
                if !spans.is_empty() {
                    hits.push(SearchHit {
                        day,
                        block_index,
                        task_id: task.id.clone(),
                        spans,
                    });
                }
            }
        }
    }
    hits
}
