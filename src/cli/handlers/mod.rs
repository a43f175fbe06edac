mod init;
pub use init::cmd_init;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{Datelike, Local, Timelike};
use log::info;
use regex::Regex;

/// Global override for the planner directory (set by -C flag)
static PLANNER_DIR_OVERRIDE: Mutex<Option<PathBuf>> = Mutex::new(None);

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::lock::{DEFAULT_LOCK_TIMEOUT, PlannerLock};
use crate::io::logging;
use crate::io::planner_io::{self, PLANNER_DIR, PlannerError};
use crate::io::recovery::{self, RecoveryCategory, RecoveryEntry};
use crate::model::config::LogConfig;
use crate::model::planner::Planner;
use crate::model::schedule::{Day, UnknownDay, WeeklySchedule};
use crate::model::task::{Task, TaskId};
use crate::ops::propagate::{PropagateMode, apply_block_to_all_days};
use crate::ops::slot_ops::{merge_adjacent, require_block, split_slot};
use crate::ops::splice::splice;
use crate::ops::task_ops::{self, TaskPatch};
use crate::ops::{check, search};
use crate::parse::parse_range;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;

    // Store -C override for planner_root()
    if let Some(ref dir) = cli.planner_dir {
        let abs = std::fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?;
        PLANNER_DIR_OVERRIDE.lock().unwrap().replace(abs);
    }

    match cli.command {
        // Init is handled in main.rs before planner discovery
        Commands::Init(args) => cmd_init(args),

        // Read commands
        Commands::Show(args) => cmd_show(args, json),
        Commands::Week => cmd_week(json),
        Commands::Now => cmd_now(json),
        Commands::Check => cmd_check(json),
        Commands::Search(args) => cmd_search(args, json),
        Commands::Recovery(args) => cmd_recovery(args, json),

        // Write commands
        Commands::Set(args) => cmd_set(args, json),
        Commands::Merge(args) => cmd_merge(args, json),
        Commands::Split(args) => cmd_split(args, json),
        Commands::Apply(args) => cmd_apply(args, json),
        Commands::Task(cmd) => cmd_task(cmd, json),
        Commands::Reset(args) => cmd_reset(args),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn planner_root() -> Result<PathBuf, PlannerError> {
    let start = match PLANNER_DIR_OVERRIDE.lock().unwrap().as_ref() {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().map_err(PlannerError::IoError)?,
    };
    planner_io::discover_planner(&start)
}

/// Start file logging at the configured level. Never fails the command.
fn start_logging(planner_dir: &Path) {
    let level = config_io::read_config(planner_dir)
        .map(|c| c.log.level)
        .unwrap_or_else(|_| LogConfig::default().level);
    if let Err(e) = logging::init_logging(planner_dir, &level) {
        eprintln!("warning: logging disabled: {}", e);
    }
}

/// Load for a read-only command
fn load_planner_cwd() -> Result<Planner, PlannerError> {
    let root = planner_root()?;
    start_logging(&root.join(PLANNER_DIR));
    planner_io::load_planner(&root)
}

/// Take the planner lock, then load. Hold the lock until the save.
fn lock_and_load() -> Result<(PlannerLock, Planner), PlannerError> {
    let root = planner_root()?;
    let planner_dir = root.join(PLANNER_DIR);
    start_logging(&planner_dir);
    let lock = PlannerLock::acquire(&planner_dir, DEFAULT_LOCK_TIMEOUT)?;
    let planner = planner_io::load_planner(&root)?;
    Ok((lock, planner))
}

fn save(planner: &Planner, schedule: &WeeklySchedule) -> Result<(), PlannerError> {
    planner_io::save_schedule(&planner.planner_dir, &planner.config.storage.key, schedule)
}

/// Day name, three-letter abbreviation, or "today"
fn resolve_day(text: &str) -> Result<Day, UnknownDay> {
    if text.trim().eq_ignore_ascii_case("today") {
        return Ok(Day::from_weekday(Local::now().weekday()));
    }
    text.parse()
}

fn print_day(schedule: &WeeklySchedule, day: Day, json: bool) -> CmdResult {
    let partition = schedule.day(day);
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&day_to_json(day, partition))?
        );
    } else {
        for line in format_day_listing(day, partition) {
            println!("{}", line);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Read command handlers
// ---------------------------------------------------------------------------

fn cmd_show(args: ShowArgs, json: bool) -> CmdResult {
    let planner = load_planner_cwd()?;
    let day = resolve_day(args.day.as_deref().unwrap_or("today"))?;
    print_day(&planner.schedule, day, json)
}

fn cmd_week(json: bool) -> CmdResult {
    let planner = load_planner_cwd()?;
    if json {
        let days: Vec<DayJson> = planner
            .schedule
            .iter()
            .map(|(day, partition)| day_to_json(day, partition))
            .collect();
        println!("{}", serde_json::to_string_pretty(&days)?);
        return Ok(());
    }
    for (i, (day, partition)) in planner.schedule.iter().enumerate() {
        if i > 0 {
            println!();
        }
        for line in format_day_summary(day, partition) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_now(json: bool) -> CmdResult {
    let planner = load_planner_cwd()?;
    let now = Local::now();
    let day = Day::from_weekday(now.weekday());
    let minute = now.hour() * 60 + now.minute();
    let (index, block) = planner
        .schedule
        .day(day)
        .block_at(minute)
        .ok_or_else(|| format!("{} has no block covering {}", day, format_minute(minute)))?;

    if json {
        let out = NowJson {
            day,
            minute,
            block: block_to_json(index, block),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{} {}", day, format_minute(minute));
        for line in format_block(index, block) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_check(json: bool) -> CmdResult {
    let root = planner_root()?;
    let planner_dir = root.join(PLANNER_DIR);
    let config = config_io::read_config(&planner_dir)?;
    let path = planner_io::snapshot_path(&planner_dir, &config.storage.key);

    let text = match std::fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if json {
                println!("{}", serde_json::to_string_pretty(&check::CheckResult {
                    valid: true,
                    ..Default::default()
                })?);
            } else {
                println!("no schedule saved yet; the default week is in use");
            }
            return Ok(());
        }
        Err(source) => return Err(PlannerError::ReadError { path, source }.into()),
    };
    let result = check::check_snapshot(&text);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if !result.errors.is_empty() {
        println!("Errors:");
        for err in &result.errors {
            match err {
                check::CheckError::InvalidJson { message } => {
                    println!("  not a schedule snapshot: {}", message);
                }
                check::CheckError::UnknownDay { name } => {
                    println!("  unknown day \"{}\"", name);
                }
                check::CheckError::BrokenPartition { day, violation } => {
                    println!("  [{}] {}", day, violation);
                }
            }
        }
    }
    if !result.warnings.is_empty() {
        if !result.errors.is_empty() {
            println!();
        }
        println!("Warnings:");
        for warn in &result.warnings {
            match warn {
                check::CheckWarning::MissingDay { day } => {
                    println!("  [{}] missing, loads as 24 empty hours", day);
                }
                check::CheckWarning::DuplicateTaskId { task_id, days } => {
                    println!("  {} appears more than once: {}", task_id, days.join(", "));
                }
                check::CheckWarning::EmptyTask { day, task_id } => {
                    println!("  [{}] {} has no text", day, task_id);
                }
            }
        }
    }
    if result.valid {
        println!("✓ schedule is valid");
    } else {
        println!("✗ schedule has errors; dp will start from the default week");
    }
    Ok(())
}

fn cmd_search(args: SearchArgs, json: bool) -> CmdResult {
    let planner = load_planner_cwd()?;
    let re = Regex::new(&args.pattern)?;
    let day_filter = args.day.as_deref().map(resolve_day).transpose()?;
    let hits = search::search_tasks(&planner.schedule, &re, day_filter);

    let mut found = Vec::new();
    for hit in &hits {
        let Ok(block) = require_block(&planner.schedule, hit.day, hit.block_index) else {
            continue;
        };
        if let Some(task) = block.find_task(&hit.task_id) {
            found.push((hit, block, task));
        }
    }

    if json {
        let out: Vec<SearchHitJson> = found
            .iter()
            .map(|(hit, _, task)| SearchHitJson {
                day: hit.day,
                block: hit.block_index,
                task_id: task.id.to_string(),
                text: task.text.clone(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for (hit, block, task) in &found {
            println!(
                "[{} {} {}-{}] {}",
                hit.day,
                hit.block_index,
                format_minute(block.start),
                format_minute(block.end()),
                format_task_line(task)
            );
        }
    }
    Ok(())
}

fn cmd_recovery(args: RecoveryArgs, json: bool) -> CmdResult {
    let root = planner_root()?;
    let planner_dir = root.join(PLANNER_DIR);

    if args.prune {
        let removed = recovery::prune_recovery(&planner_dir, None)?;
        println!("Pruned {} recovery entries", removed);
        return Ok(());
    }

    let entries = recovery::read_recovery_entries(&planner_dir, Some(args.limit.unwrap_or(10)));
    if json {
        let out: Vec<serde_json::Value> = entries.iter().map(|e| e.to_json()).collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if entries.is_empty() {
        println!("recovery log is empty");
    } else {
        for entry in &entries {
            print!("{}", entry.to_display_markdown());
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write command handlers
// ---------------------------------------------------------------------------

fn cmd_set(args: SetArgs, json: bool) -> CmdResult {
    let day = resolve_day(&args.day)?;
    let range = parse_range(&args.range)?.to_time_range()?;

    let (_lock, planner) = lock_and_load()?;
    let mut discarded = Vec::new();
    let updated = planner.schedule.update_day(day, |partition, ids| {
        let tasks = args.tasks.iter().map(|t| Task::new(t.as_str(), ids)).collect();
        let result = splice(partition, range, tasks, ids);
        discarded = result.discarded;
        result.day
    });
    save(&planner, &updated)?;
    info!(
        "event=set day={} range={} tasks={} discarded={}",
        day,
        range,
        args.tasks.len(),
        discarded.len()
    );

    for task in &discarded {
        eprintln!(
            "warning: removed {} \"{}\" (its block lay inside {}-{})",
            task.id,
            task.text,
            format_minute(range.start()),
            format_minute(range.end())
        );
    }
    if json {
        return print_day(&updated, day, true);
    }
    println!(
        "{} {}-{} set with {} task(s)",
        day,
        format_minute(range.start()),
        format_minute(range.end()),
        args.tasks.len()
    );
    Ok(())
}

fn cmd_merge(args: SlotArgs, json: bool) -> CmdResult {
    let day = resolve_day(&args.day)?;
    let (_lock, planner) = lock_and_load()?;
    require_block(&planner.schedule, day, args.index)?;

    let updated = planner
        .schedule
        .update_day(day, |partition, _| merge_adjacent(partition, args.index));
    if updated == planner.schedule {
        println!("nothing to merge: block {} is the last of {}", args.index, day);
        return Ok(());
    }
    save(&planner, &updated)?;
    info!("event=merge day={} index={}", day, args.index);

    if json {
        return print_day(&updated, day, true);
    }
    let merged = require_block(&updated, day, args.index)?;
    println!(
        "{} {}-{} merged",
        day,
        format_minute(merged.start),
        format_minute(merged.end())
    );
    Ok(())
}

fn cmd_split(args: SlotArgs, json: bool) -> CmdResult {
    let day = resolve_day(&args.day)?;
    let (_lock, planner) = lock_and_load()?;
    require_block(&planner.schedule, day, args.index)?;
    let base_unit = planner.config.schedule.base_unit;

    let updated = planner
        .schedule
        .update_day(day, |partition, _| split_slot(partition, args.index, base_unit));
    if updated == planner.schedule {
        println!(
            "nothing to split: block {} of {} is not longer than {}",
            args.index,
            day,
            format_span(base_unit)
        );
        return Ok(());
    }
    save(&planner, &updated)?;
    info!(
        "event=split day={} index={} base_unit={}",
        day, args.index, base_unit
    );

    if json {
        return print_day(&updated, day, true);
    }
    println!("{} block {} split", day, args.index);
    Ok(())
}

fn cmd_apply(args: ApplyArgs, json: bool) -> CmdResult {
    let day = resolve_day(&args.day)?;
    let mode = if args.append {
        PropagateMode::Append
    } else {
        PropagateMode::Replace
    };
    let (_lock, planner) = lock_and_load()?;
    let source = require_block(&planner.schedule, day, args.index)?;
    let (start, end) = (source.start, source.end());

    let updated = apply_block_to_all_days(&planner.schedule, day, args.index, mode)?;
    save(&planner, &updated)?;

    if json {
        return print_day(&updated, day, true);
    }
    println!(
        "{}-{} from {} applied to every day ({})",
        format_minute(start),
        format_minute(end),
        day,
        if args.append { "append" } else { "replace" }
    );
    Ok(())
}

fn cmd_task(cmd: TaskCmd, json: bool) -> CmdResult {
    let (day, index) = match &cmd.action {
        TaskAction::Add(a) => (&a.day, a.index),
        TaskAction::Edit(a) => (&a.day, a.index),
        TaskAction::Done(a) | TaskAction::Undone(a) | TaskAction::Rm(a) => (&a.day, a.index),
    };
    let day = resolve_day(day)?;

    let (_lock, planner) = lock_and_load()?;
    let block = require_block(&planner.schedule, day, index)?;

    let (updated, message) = match cmd.action {
        TaskAction::Add(args) => {
            let updated = planner.schedule.update_day(day, |partition, ids| {
                partition
                    .map_block_tasks(index, |b| task_ops::add_task(b, &args.text, ids))
                    .unwrap_or_else(|| partition.clone())
            });
            let added = require_block(&updated, day, index)?
                .tasks
                .last()
                .map(|t| t.id.to_string())
                .unwrap_or_default();
            (updated, format!("{} added", added))
        }
        TaskAction::Edit(args) => {
            let id = TaskId::new(args.id);
            task_ops::require_task(block, &id)?;
            let patch = TaskPatch::text(args.text);
            let updated = patch_task(&planner.schedule, day, index, &id, &patch);
            (updated, format!("{} updated", id))
        }
        TaskAction::Done(args) => {
            let id = TaskId::new(args.id);
            task_ops::require_task(block, &id)?;
            let updated = patch_task(&planner.schedule, day, index, &id, &TaskPatch::done(true));
            (updated, format!("{} done", id))
        }
        TaskAction::Undone(args) => {
            let id = TaskId::new(args.id);
            task_ops::require_task(block, &id)?;
            let updated = patch_task(&planner.schedule, day, index, &id, &TaskPatch::done(false));
            (updated, format!("{} reopened", id))
        }
        TaskAction::Rm(args) => {
            let id = TaskId::new(args.id);
            task_ops::require_task(block, &id)?;
            let updated = planner.schedule.update_day(day, |partition, _| {
                partition
                    .map_block_tasks(index, |b| task_ops::remove_task(b, &id))
                    .unwrap_or_else(|| partition.clone())
            });
            (updated, format!("{} removed", id))
        }
    };

    save(&planner, &updated)?;
    info!("event=task day={} index={} result=\"{}\"", day, index, message);

    if json {
        return print_day(&updated, day, true);
    }
    println!("{}", message);
    Ok(())
}

fn patch_task(
    schedule: &WeeklySchedule,
    day: Day,
    index: usize,
    id: &TaskId,
    patch: &TaskPatch,
) -> WeeklySchedule {
    schedule.update_day(day, |partition, _| {
        partition
            .map_block_tasks(index, |b| task_ops::update_task(b, id, patch))
            .unwrap_or_else(|| partition.clone())
    })
}

fn cmd_reset(args: ResetArgs) -> CmdResult {
    let day = resolve_day(&args.day)?;
    if !args.yes {
        return Err(format!(
            "reset discards every block and task on {}; rerun with --yes to confirm",
            day
        )
        .into());
    }

    let (_lock, planner) = lock_and_load()?;
    let previous = planner.schedule.day(day);
    let task_count = previous.task_ids().count();
    let updated = planner.schedule.reset_day(day);
    if updated == planner.schedule {
        println!("{} is already 24 empty hours", day);
        return Ok(());
    }

    recovery::log_recovery(
        &planner.planner_dir,
        RecoveryEntry::now(RecoveryCategory::Reset, format!("{} reset", day))
            .field("Day", day.name())
            .field("Tasks", task_count.to_string())
            .body(serde_json::to_string_pretty(previous)?),
    );
    save(&planner, &updated)?;
    info!("event=reset day={} discarded={}", day, task_count);

    println!(
        "{} reset ({} task(s) discarded; see `dp recovery`)",
        day, task_count
    );
    Ok(())
}
