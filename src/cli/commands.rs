use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "dp", about = concat!("dayplan v", env!("CARGO_PKG_VERSION"), " - one week, cut into blocks"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different planner directory
    #[arg(short = 'C', long = "planner-dir", global = true)]
    pub planner_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create dayplan/ in the current directory
    Init(InitArgs),
    /// Show one day's blocks (default: today)
    Show(ShowArgs),
    /// Show every day of the week
    Week,
    /// Show the block covering the current time
    Now,
    /// Validate the stored schedule
    Check,
    /// Make a time range one block, with the given tasks
    Set(SetArgs),
    /// Merge a block with the one after it
    Merge(SlotArgs),
    /// Split a base-unit block off the front of a block
    Split(SlotArgs),
    /// Copy a block's range and tasks onto every day
    Apply(ApplyArgs),
    /// Add, edit, complete or remove tasks in a block
    Task(TaskCmd),
    /// Put a day back to 24 empty hours
    Reset(ResetArgs),
    /// Search task text by regex
    Search(SearchArgs),
    /// View or prune the recovery log
    Recovery(RecoveryArgs),
}

// ---------------------------------------------------------------------------
// Read command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// Rewrite config.toml even if dayplan/ already exists
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Day name (mon, Tuesday, today); default: today
    pub day: Option<String>,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Regex pattern to search for
    pub pattern: String,
    /// Limit search to one day
    #[arg(long)]
    pub day: Option<String>,
}

#[derive(Args)]
pub struct RecoveryArgs {
    /// Maximum number of entries to show (default: 10)
    #[arg(long)]
    pub limit: Option<usize>,
    /// Remove entries older than 30 days instead of showing them
    #[arg(long)]
    pub prune: bool,
}

// ---------------------------------------------------------------------------
// Write command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct SetArgs {
    /// Day name, or "today"
    pub day: String,
    /// Time range, e.g. 9-10:30, "9am to 5pm", 1300~1415
    pub range: String,
    /// Task for the new block (repeatable)
    #[arg(long = "task", value_name = "TEXT")]
    pub tasks: Vec<String>,
}

#[derive(Args)]
pub struct SlotArgs {
    /// Day name, or "today"
    pub day: String,
    /// Block index as printed by `dp show`
    pub index: usize,
}

#[derive(Args)]
pub struct ApplyArgs {
    /// Day holding the source block
    pub day: String,
    /// Block index as printed by `dp show`
    pub index: usize,
    /// Add the tasks to each day's existing block instead of replacing them
    #[arg(long)]
    pub append: bool,
}

#[derive(Args)]
pub struct ResetArgs {
    /// Day name, or "today"
    pub day: String,
    /// Confirm that the day's tasks are discarded
    #[arg(long)]
    pub yes: bool,
}

// ---------------------------------------------------------------------------
// Task subcommands
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct TaskCmd {
    #[command(subcommand)]
    pub action: TaskAction,
}

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a task to a block
    Add(TaskAddArgs),
    /// Change a task's text
    Edit(TaskEditArgs),
    /// Mark a task done
    Done(TaskRefArgs),
    /// Mark a task not done
    Undone(TaskRefArgs),
    /// Remove a task
    Rm(TaskRefArgs),
}

#[derive(Args)]
pub struct TaskAddArgs {
    pub day: String,
    pub index: usize,
    /// Task text
    pub text: String,
}

#[derive(Args)]
pub struct TaskEditArgs {
    pub day: String,
    pub index: usize,
    /// Task id, e.g. t4
    pub id: String,
    /// New text
    pub text: String,
}

#[derive(Args)]
pub struct TaskRefArgs {
    pub day: String,
    pub index: usize,
    /// Task id, e.g. t4
    pub id: String,
}
