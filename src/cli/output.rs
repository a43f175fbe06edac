use serde::Serialize;

use crate::model::block::Block;
use crate::model::partition::DayPartition;
use crate::model::schedule::Day;
use crate::model::task::Task;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    pub id: String,
    pub text: String,
    pub done: bool,
}

#[derive(Serialize)]
pub struct BlockJson {
    pub index: usize,
    pub start: u32,
    pub span: u32,
    /// "HH:MM"
    pub from: String,
    /// "HH:MM", "24:00" for the last block of the day
    pub to: String,
    pub tasks: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct DayJson {
    pub day: Day,
    pub blocks: Vec<BlockJson>,
}

#[derive(Serialize)]
pub struct NowJson {
    pub day: Day,
    pub minute: u32,
    pub block: BlockJson,
}

#[derive(Serialize)]
pub struct SearchHitJson {
    pub day: Day,
    pub block: usize,
    pub task_id: String,
    pub text: String,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn task_to_json(task: &Task) -> TaskJson {
    TaskJson {
        id: task.id.to_string(),
        text: task.text.clone(),
        done: task.done,
    }
}

pub fn block_to_json(index: usize, block: &Block) -> BlockJson {
    BlockJson {
        index,
        start: block.start,
        span: block.span,
        from: format_minute(block.start),
        to: format_minute(block.end()),
        tasks: block.tasks.iter().map(task_to_json).collect(),
    }
}

pub fn day_to_json(day: Day, partition: &DayPartition) -> DayJson {
    DayJson {
        day,
        blocks: partition
            .blocks()
            .iter()
            .enumerate()
            .map(|(i, b)| block_to_json(i, b))
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// Minute-of-day as "HH:MM"; 1440 renders as "24:00"
pub fn format_minute(minute: u32) -> String {
    format!("{:02}:{:02}", minute / 60, minute % 60)
}

/// Block length as "1h", "45m" or "2h30m"
pub fn format_span(span: u32) -> String {
    match (span / 60, span % 60) {
        (0, m) => format!("{}m", m),
        (h, 0) => format!("{}h", h),
        (h, m) => format!("{}h{}m", h, m),
    }
}

/// Format a single task as a one-line summary
pub fn format_task_line(task: &Task) -> String {
    let mark = if task.done { 'x' } else { ' ' };
    format!("[{}] {} {}", mark, task.id, task.text)
}

/// "  3  09:00-10:30  (1h30m)" followed by the block's tasks, indented
pub fn format_block(index: usize, block: &Block) -> Vec<String> {
    let mut lines = vec![format!(
        "{:>3}  {}-{}  ({})",
        index,
        format_minute(block.start),
        format_minute(block.end()),
        format_span(block.span)
    )];
    for task in &block.tasks {
        lines.push(format!("       {}", format_task_line(task)));
    }
    lines
}

/// Every block of one day under a header
pub fn format_day_listing(day: Day, partition: &DayPartition) -> Vec<String> {
    let mut lines = vec![format!("== {} ==", day)];
    for (index, block) in partition.blocks().iter().enumerate() {
        lines.extend(format_block(index, block));
    }
    lines
}

/// Compact view for `dp week`: only blocks that hold tasks are listed
pub fn format_day_summary(day: Day, partition: &DayPartition) -> Vec<String> {
    let task_count: usize = partition.blocks().iter().map(|b| b.tasks.len()).sum();
    let mut lines = vec![format!(
        "== {} == {} blocks, {} tasks",
        day,
        partition.len(),
        task_count
    )];
    for (index, block) in partition.blocks().iter().enumerate() {
        if !block.tasks.is_empty() {
            lines.extend(format_block(index, block));
        }
    }
    lines
}
