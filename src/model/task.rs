use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque task identifier, unique within a weekly schedule
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        TaskId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The counter digits, leading zeros dropped, if this id has the minted shape
    fn minted_digits(&self) -> Option<&str> {
        let digits = self.0.strip_prefix(TaskIdMint::PREFIX)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        match digits.trim_start_matches('0') {
            "" => Some("0"),
            trimmed => Some(trimmed),
        }
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Monotonic source of task ids.
///
/// Minted ids look like `t17`. The counter is held as decimal text, so it
/// has no ceiling to overflow. A mint seeded from existing ids always starts
/// above the largest minted number it has seen, so it never hands out an id
/// that is already in use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskIdMint {
    next: String,
}

impl TaskIdMint {
    const PREFIX: &'static str = "t";

    pub fn new() -> Self {
        TaskIdMint {
            next: "1".to_string(),
        }
    }

    /// Seed a mint that will not collide with any of `existing`
    pub fn seeded<'a>(existing: impl IntoIterator<Item = &'a TaskId>) -> Self {
        let highest = existing
            .into_iter()
            .filter_map(TaskId::minted_digits)
            .max_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)))
            .unwrap_or("0");
        TaskIdMint {
            next: increment_decimal(highest),
        }
    }

    pub fn mint(&mut self) -> TaskId {
        let id = TaskId(format!("{}{}", Self::PREFIX, self.next));
        self.next = increment_decimal(&self.next);
        id
    }
}

/// Add one to a string of ASCII digits
fn increment_decimal(digits: &str) -> String {
    let mut out: Vec<u8> = digits.bytes().collect();
    let mut i = out.len();
    loop {
        if i == 0 {
            out.insert(0, b'1');
            break;
        }
        i -= 1;
        if out[i] == b'9' {
            out[i] = b'0';
        } else {
            out[i] += 1;
            break;
        }
    }
    out.into_iter().map(char::from).collect()
}

impl Default for TaskIdMint {
    fn default() -> Self {
        Self::new()
    }
}

/// A single to-do entry inside a time block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    #[serde(default)]
    pub done: bool,
}

impl Task {
    /// Create an open task with a freshly minted id
    pub fn new(text: impl Into<String>, ids: &mut TaskIdMint) -> Self {
        Task {
            id: ids.mint(),
            text: text.into(),
            done: false,
        }
    }

    /// Copy this task under a new identity. Text and done state carry over.
    pub fn fresh_copy(&self, ids: &mut TaskIdMint) -> Self {
        Task {
            id: ids.mint(),
            text: self.text.clone(),
            done: self.done,
        }
    }
}

/// Copy every task under a new identity, preserving order
pub fn fresh_copies(tasks: &[Task], ids: &mut TaskIdMint) -> Vec<Task> {
    tasks.iter().map(|t| t.fresh_copy(ids)).collect()
}
