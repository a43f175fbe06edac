use serde::{Deserialize, Serialize};

use super::task::{Task, TaskId};

/// A contiguous stretch of one day, in minutes since midnight, with its tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// First minute covered by the block
    pub start: u32,
    /// Length in minutes (always at least 1 inside a valid partition)
    pub span: u32,
    /// Tasks in insertion order
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Block {
    pub fn new(start: u32, span: u32, tasks: Vec<Task>) -> Self {
        Block { start, span, tasks }
    }

    /// An empty block
    pub fn empty(start: u32, span: u32) -> Self {
        Block::new(start, span, Vec::new())
    }

    /// One past the last minute covered
    pub fn end(&self) -> u32 {
        self.start.saturating_add(self.span)
    }

    pub fn contains_minute(&self, minute: u32) -> bool {
        self.start <= minute && minute < self.end()
    }

    pub fn find_task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    /// Same bounds, different task list
    pub fn with_tasks(&self, tasks: Vec<Task>) -> Block {
        Block::new(self.start, self.span, tasks)
    }
}
