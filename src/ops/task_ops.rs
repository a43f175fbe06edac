use crate::model::block::Block;
use crate::model::task::{Task, TaskId, TaskIdMint};

/// Error type for task lookups made on behalf of a caller
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("task not found: {0}")]
    NotFound(TaskId),
}

/// Fields to overwrite on an existing task; `None` leaves a field alone
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub text: Option<String>,
    pub done: Option<bool>,
}

impl TaskPatch {
    pub fn text(text: impl Into<String>) -> Self {
        TaskPatch {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn done(done: bool) -> Self {
        TaskPatch {
            done: Some(done),
            ..Default::default()
        }
    }

    fn apply(&self, task: &Task) -> Task {
        Task {
            id: task.id.clone(),
            text: self.text.clone().unwrap_or_else(|| task.text.clone()),
            done: self.done.unwrap_or(task.done),
        }
    }
}

// ---------------------------------------------------------------------------
// Ledger operations (each returns a new block)
// ---------------------------------------------------------------------------

/// Append an open task with a fresh id
pub fn add_task(block: &Block, text: &str, ids: &mut TaskIdMint) -> Block {
    let mut tasks = block.tasks.clone();
    tasks.push(Task::new(text, ids));
    block.with_tasks(tasks)
}

/// Overwrite fields of the task with `id`. Unknown ids leave the block as is.
pub fn update_task(block: &Block, id: &TaskId, patch: &TaskPatch) -> Block {
    let tasks = block
        .tasks
        .iter()
        .map(|t| if &t.id == id { patch.apply(t) } else { t.clone() })
        .collect();
    block.with_tasks(tasks)
}

/// Drop the task with `id`, keeping the others in order
pub fn remove_task(block: &Block, id: &TaskId) -> Block {
    let tasks = block.tasks.iter().filter(|t| &t.id != id).cloned().collect();
    block.with_tasks(tasks)
}

/// Resolve a task id in a block, for callers that want to report misses
pub fn require_task<'a>(block: &'a Block, id: &TaskId) -> Result<&'a Task, TaskError> {
    block
        .find_task(id)
        .ok_or_else(|| TaskError::NotFound(id.clone()))
}
