//! Integration tests for the `dp` CLI.
//!
//! Each test creates a temp planner directory, runs `dp` as a subprocess,
//! and verifies stdout/stderr and/or the stored snapshot.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::{Value, json};

/// Get the path to the built `dp` binary.
fn dp_bin() -> PathBuf {
    // cargo test builds to target/debug/
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("dp");
    path
}

fn snapshot_file(root: &Path) -> PathBuf {
    root.join("dayplan").join("weekly-schedule-v1.json")
}

/// Twenty-four one-hour blocks; `tasks` places (hour, id, text) entries.
fn hourly_day(tasks: &[(u32, &str, &str)]) -> Value {
    let blocks: Vec<Value> = (0..24)
        .map(|h| {
            let tasks: Vec<Value> = tasks
                .iter()
                .filter(|(hour, _, _)| *hour == h)
                .map(|(_, id, text)| json!({ "id": id, "text": text, "done": false }))
                .collect();
            json!({ "start": h * 60, "span": 60, "tasks": tasks })
        })
        .collect();
    Value::Array(blocks)
}

/// Create a planner whose Monday has "Standup" at 10:00 and "Lunch" at 12:00,
/// and whose Tuesday has "Gym" at 07:00.
fn create_test_planner(root: &Path) {
    fs::create_dir_all(root.join("dayplan")).unwrap();
    let snapshot = json!({
        "Monday": hourly_day(&[(10, "t1", "Standup"), (12, "t2", "Lunch")]),
        "Tuesday": hourly_day(&[(7, "t3", "Gym")]),
    });
    fs::write(
        snapshot_file(root),
        serde_json::to_string_pretty(&snapshot).unwrap(),
    )
    .unwrap();
}

fn read_snapshot(root: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(snapshot_file(root)).unwrap()).unwrap()
}

/// (start, end) of every block of `day` in the stored snapshot
fn stored_bounds(root: &Path, day: &str) -> Vec<(u64, u64)> {
    read_snapshot(root)[day]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| {
            let start = b["start"].as_u64().unwrap();
            (start, start + b["span"].as_u64().unwrap())
        })
        .collect()
}

fn assert_partitions_day(bounds: &[(u64, u64)]) {
    assert_eq!(bounds.first().unwrap().0, 0);
    assert_eq!(bounds.last().unwrap().1, 1440);
    for pair in bounds.windows(2) {
        assert_eq!(pair[0].1, pair[1].0, "blocks not contiguous: {:?}", bounds);
    }
}

/// Run `dp` with the given args in the given directory, returning (stdout, stderr, success).
fn run_dp(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(dp_bin())
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run dp");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Run `dp` expecting success, return stdout.
fn run_dp_ok(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_dp(dir, args);
    if !success {
        panic!(
            "dp {:?} failed:\nstdout: {}\nstderr: {}",
            args, stdout, stderr
        );
    }
    stdout
}

// ---------------------------------------------------------------------------
// Init
// ---------------------------------------------------------------------------

#[test]
fn test_init_creates_planner() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out = run_dp_ok(tmp.path(), &["init"]);
    assert!(out.contains("Initialized dayplan"));
    let config = fs::read_to_string(tmp.path().join("dayplan/config.toml")).unwrap();
    assert!(config.contains("base_unit = 60"));

    // Fresh planner shows the default day
    let out = run_dp_ok(tmp.path(), &["show", "wed"]);
    assert!(out.contains("== Wednesday =="));
    assert!(out.contains(" 23  23:00-24:00  (1h)"));
}

#[test]
fn test_init_twice_needs_force() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_dp_ok(tmp.path(), &["init"]);
    let (_, stderr, success) = run_dp(tmp.path(), &["init"]);
    assert!(!success);
    assert!(stderr.contains("--force"));
    run_dp_ok(tmp.path(), &["init", "--force"]);
}

#[test]
fn test_not_a_planner() {
    let tmp = tempfile::TempDir::new().unwrap();
    let nested = tmp.path().join("empty");
    fs::create_dir(&nested).unwrap();
    let (_, stderr, success) = run_dp(tmp.path(), &["-C", nested.to_str().unwrap(), "week"]);
    // A dayplan/ in an ancestor of the temp dir would be found instead.
    if !success {
        assert!(stderr.contains("dp init"));
    }
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

#[test]
fn test_show_day() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_planner(tmp.path());

    let out = run_dp_ok(tmp.path(), &["show", "monday"]);
    assert!(out.contains(" 10  10:00-11:00  (1h)"));
    assert!(out.contains("[ ] t1 Standup"));
    assert!(!out.contains("Gym"));
}

#[test]
fn test_show_json() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_planner(tmp.path());

    let out = run_dp_ok(tmp.path(), &["show", "tue", "--json"]);
    let parsed: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed["day"], "Tuesday");
    assert_eq!(parsed["blocks"].as_array().unwrap().len(), 24);
    assert_eq!(parsed["blocks"][7]["from"], "07:00");
    assert_eq!(parsed["blocks"][7]["tasks"][0]["text"], "Gym");
}

#[test]
fn test_week_lists_every_day() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_planner(tmp.path());

    let out = run_dp_ok(tmp.path(), &["week"]);
    for day in ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"] {
        assert!(out.contains(&format!("== {} ==", day)), "missing {}", day);
    }
    assert!(out.contains("== Monday == 24 blocks, 2 tasks"));
    assert!(out.contains("Gym"));

    let json = run_dp_ok(tmp.path(), &["week", "--json"]);
    let parsed: Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), 7);
    assert_eq!(parsed[6]["day"], "Sunday");
}

#[test]
fn test_now_and_today() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_planner(tmp.path());

    let out = run_dp_ok(tmp.path(), &["now", "--json"]);
    let parsed: Value = serde_json::from_str(&out).unwrap();
    let minute = parsed["minute"].as_u64().unwrap();
    let start = parsed["block"]["start"].as_u64().unwrap();
    let span = parsed["block"]["span"].as_u64().unwrap();
    assert!(start <= minute && minute < start + span);

    run_dp_ok(tmp.path(), &["show", "today"]);
    run_dp_ok(tmp.path(), &["show"]);
}

#[test]
fn test_unknown_day_is_an_error() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_planner(tmp.path());
    let (_, stderr, success) = run_dp(tmp.path(), &["show", "funday"]);
    assert!(!success);
    assert!(stderr.contains("unknown day 'funday'"));
}

#[test]
fn test_search() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_planner(tmp.path());

    let out = run_dp_ok(tmp.path(), &["search", "(?i)standup|gym"]);
    assert!(out.contains("[Monday 10 10:00-11:00] [ ] t1 Standup"));
    assert!(out.contains("[Tuesday 7 07:00-08:00] [ ] t3 Gym"));

    let out = run_dp_ok(tmp.path(), &["search", "gym", "--day", "mon"]);
    assert!(out.trim().is_empty());

    let json = run_dp_ok(tmp.path(), &["search", "Lunch", "--json"]);
    let parsed: Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed[0]["task_id"], "t2");
    assert_eq!(parsed[0]["block"], 12);
}

#[test]
fn test_check_valid_and_broken() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_planner(tmp.path());

    let out = run_dp_ok(tmp.path(), &["check"]);
    assert!(out.contains("✓ schedule is valid"));
    assert!(out.contains("[Friday] missing"));

    fs::write(
        snapshot_file(tmp.path()),
        r#"{"Monday": [{"start": 0, "span": 600}, {"start": 700, "span": 740}]}"#,
    )
    .unwrap();
    let json = run_dp_ok(tmp.path(), &["check", "--json"]);
    let parsed: Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["valid"], false);
    assert_eq!(parsed["errors"][0]["type"], "broken_partition");
    assert_eq!(parsed["errors"][0]["violation"]["type"], "gap");
}

// ---------------------------------------------------------------------------
// Set (range splice)
// ---------------------------------------------------------------------------

#[test]
fn test_set_creates_exact_block() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_planner(tmp.path());

    let out = run_dp_ok(
        tmp.path(),
        &["set", "wed", "9:30-11", "--task", "Deep work", "--task", "Email"],
    );
    assert!(out.contains("Wednesday 09:30-11:00 set with 2 task(s)"));

    let bounds = stored_bounds(tmp.path(), "Wednesday");
    assert_partitions_day(&bounds);
    assert!(bounds.contains(&(540, 570)));
    assert!(bounds.contains(&(570, 660)));

    let show = run_dp_ok(tmp.path(), &["show", "wed"]);
    assert!(show.contains("09:30-11:00  (1h30m)"));
    assert!(show.contains("Deep work"));
    assert!(show.contains("Email"));
}

#[test]
fn test_set_discards_interior_tasks_with_warning() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_planner(tmp.path());

    // 09:30-13:30 swallows the whole 10:00 and 12:00 blocks
    let (_, stderr, success) = run_dp(tmp.path(), &["set", "mon", "9:30am to 1:30pm"]);
    assert!(success);
    assert!(stderr.contains("removed t1 \"Standup\""));
    assert!(stderr.contains("removed t2 \"Lunch\""));

    let show = run_dp_ok(tmp.path(), &["show", "mon"]);
    assert!(!show.contains("Standup"));
    assert!(show.contains("09:30-13:30"));
    assert_partitions_day(&stored_bounds(tmp.path(), "Monday"));
}

#[test]
fn test_set_rejects_bad_ranges() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_planner(tmp.path());
    let before = fs::read_to_string(snapshot_file(tmp.path())).unwrap();

    let (_, stderr, success) = run_dp(tmp.path(), &["set", "mon", "5pm-9am"]);
    assert!(!success);
    assert!(stderr.contains("error:"));

    let (_, stderr, success) = run_dp(tmp.path(), &["set", "mon", "lunch"]);
    assert!(!success);
    assert!(stderr.contains("could not read 'lunch' as a time range"));

    assert_eq!(fs::read_to_string(snapshot_file(tmp.path())).unwrap(), before);
}

// ---------------------------------------------------------------------------
// Merge / split
// ---------------------------------------------------------------------------

#[test]
fn test_merge_then_split() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_planner(tmp.path());

    run_dp_ok(tmp.path(), &["merge", "mon", "10"]);
    let show = run_dp_ok(tmp.path(), &["show", "mon"]);
    assert!(show.contains(" 10  10:00-12:00  (2h)"));
    assert_eq!(stored_bounds(tmp.path(), "Monday").len(), 23);

    run_dp_ok(tmp.path(), &["split", "mon", "10"]);
    let snapshot = read_snapshot(tmp.path());
    assert_eq!(snapshot["Monday"][10]["span"], 60);
    assert_eq!(snapshot["Monday"][10]["tasks"][0]["text"], "Standup");
    assert_eq!(snapshot["Monday"][11]["tasks"].as_array().unwrap().len(), 0);
    assert_partitions_day(&stored_bounds(tmp.path(), "Monday"));
}

#[test]
fn test_merge_and_split_noops() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_planner(tmp.path());
    let before = fs::read_to_string(snapshot_file(tmp.path())).unwrap();

    let out = run_dp_ok(tmp.path(), &["merge", "mon", "23"]);
    assert!(out.contains("nothing to merge"));
    let out = run_dp_ok(tmp.path(), &["split", "mon", "3"]);
    assert!(out.contains("nothing to split"));

    assert_eq!(fs::read_to_string(snapshot_file(tmp.path())).unwrap(), before);

    let (_, stderr, success) = run_dp(tmp.path(), &["merge", "mon", "40"]);
    assert!(!success);
    assert!(stderr.contains("Monday has no block 40 (it has 24)"));
}

#[test]
fn test_split_uses_configured_base_unit() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_planner(tmp.path());
    fs::write(
        tmp.path().join("dayplan/config.toml"),
        "[schedule]\nbase_unit = 15\n",
    )
    .unwrap();

    run_dp_ok(tmp.path(), &["split", "sun", "0"]);
    let bounds = stored_bounds(tmp.path(), "Sunday");
    assert_eq!(&bounds[..2], &[(0, 15), (15, 60)]);
}

#[test]
fn test_invalid_config_is_an_error() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_planner(tmp.path());
    fs::write(
        tmp.path().join("dayplan/config.toml"),
        "[schedule]\nbase_unit = 0\n",
    )
    .unwrap();

    let (_, stderr, success) = run_dp(tmp.path(), &["show", "mon"]);
    assert!(!success);
    assert!(stderr.contains("invalid config.toml"));
}

// ---------------------------------------------------------------------------
// Apply (propagation)
// ---------------------------------------------------------------------------

#[test]
fn test_apply_replace_copies_to_every_day() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_planner(tmp.path());

    let out = run_dp_ok(tmp.path(), &["apply", "tue", "7"]);
    assert!(out.contains("07:00-08:00 from Tuesday applied to every day (replace)"));

    let snapshot = read_snapshot(tmp.path());
    let mut ids = Vec::new();
    for day in ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"] {
        let tasks = snapshot[day][7]["tasks"].as_array().unwrap();
        assert_eq!(tasks.len(), 1, "{}", day);
        assert_eq!(tasks[0]["text"], "Gym");
        ids.push(tasks[0]["id"].as_str().unwrap().to_string());
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 7, "every copy has its own id");
}

#[test]
fn test_apply_append_keeps_existing_tasks() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_planner(tmp.path());

    // Tuesday 10:00 gets "Review"; Monday 10:00 already has Standup
    run_dp_ok(tmp.path(), &["task", "add", "tue", "10", "Review"]);
    run_dp_ok(tmp.path(), &["apply", "tue", "10", "--append"]);

    let snapshot = read_snapshot(tmp.path());
    let monday: Vec<&str> = snapshot["Monday"][10]["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["text"].as_str().unwrap())
        .collect();
    assert_eq!(monday, vec!["Standup", "Review"]);

    // the source block gains a copy of its own task
    let tuesday = snapshot["Tuesday"][10]["tasks"].as_array().unwrap();
    assert_eq!(tuesday.len(), 2);
    assert_eq!(tuesday[0]["text"], tuesday[1]["text"]);
    assert_ne!(tuesday[0]["id"], tuesday[1]["id"]);
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[test]
fn test_task_lifecycle() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_planner(tmp.path());

    // Ids continue above the highest stored one
    let out = run_dp_ok(tmp.path(), &["task", "add", "mon", "10", "Write notes"]);
    assert!(out.contains("t4 added"));

    run_dp_ok(tmp.path(), &["task", "done", "mon", "10", "t4"]);
    let show = run_dp_ok(tmp.path(), &["show", "mon"]);
    assert!(show.contains("[x] t4 Write notes"));

    run_dp_ok(tmp.path(), &["task", "undone", "mon", "10", "t4"]);
    run_dp_ok(tmp.path(), &["task", "edit", "mon", "10", "t4", "Write minutes"]);
    let show = run_dp_ok(tmp.path(), &["show", "mon"]);
    assert!(show.contains("[ ] t4 Write minutes"));

    run_dp_ok(tmp.path(), &["task", "rm", "mon", "10", "t1"]);
    let snapshot = read_snapshot(tmp.path());
    let texts: Vec<&str> = snapshot["Monday"][10]["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["text"].as_str().unwrap())
        .collect();
    assert_eq!(texts, vec!["Write minutes"]);
}

#[test]
fn test_task_unknown_id_is_an_error() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_planner(tmp.path());

    let (_, stderr, success) = run_dp(tmp.path(), &["task", "done", "mon", "11", "t1"]);
    assert!(!success);
    assert!(stderr.contains("task not found: t1"));
}

// ---------------------------------------------------------------------------
// Reset and recovery
// ---------------------------------------------------------------------------

#[test]
fn test_reset_requires_yes_and_logs_recovery() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_planner(tmp.path());
    run_dp_ok(tmp.path(), &["merge", "mon", "0"]);

    let (_, stderr, success) = run_dp(tmp.path(), &["reset", "mon"]);
    assert!(!success);
    assert!(stderr.contains("--yes"));
    assert_eq!(stored_bounds(tmp.path(), "Monday").len(), 23);

    let out = run_dp_ok(tmp.path(), &["reset", "mon", "--yes"]);
    assert!(out.contains("Monday reset (2 task(s) discarded"));
    assert_eq!(stored_bounds(tmp.path(), "Monday").len(), 24);

    let out = run_dp_ok(tmp.path(), &["recovery"]);
    assert!(out.contains("[reset] Monday reset"));
    assert!(out.contains("Standup"));

    let json = run_dp_ok(tmp.path(), &["recovery", "--json"]);
    let parsed: Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed[0]["category"], "reset");
    assert_eq!(parsed[0]["fields"]["Day"], "Monday");
}

#[test]
fn test_corrupt_snapshot_falls_back_to_default() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_planner(tmp.path());
    fs::write(snapshot_file(tmp.path()), "{ not json").unwrap();

    let out = run_dp_ok(tmp.path(), &["show", "mon"]);
    assert!(out.contains(" 23  23:00-24:00  (1h)"));
    assert!(!out.contains("Standup"));

    let out = run_dp_ok(tmp.path(), &["recovery"]);
    assert!(out.contains("[snapshot] unreadable schedule replaced"));
    assert!(out.contains("{ not json"));
}

#[test]
fn test_recovery_prune_and_empty() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_planner(tmp.path());

    let out = run_dp_ok(tmp.path(), &["recovery"]);
    assert!(out.contains("recovery log is empty"));
    let out = run_dp_ok(tmp.path(), &["recovery", "--prune"]);
    assert!(out.contains("Pruned 0 recovery entries"));
}

// ---------------------------------------------------------------------------
// Global flags and logging
// ---------------------------------------------------------------------------

#[test]
fn test_planner_dir_flag() {
    let tmp = tempfile::TempDir::new().unwrap();
    let root = tmp.path().join("planner");
    let elsewhere = tmp.path().join("elsewhere");
    fs::create_dir_all(&elsewhere).unwrap();
    create_test_planner(&root);

    let out = run_dp_ok(&elsewhere, &["-C", root.to_str().unwrap(), "show", "tue"]);
    assert!(out.contains("Gym"));
}

#[test]
fn test_writes_log_events() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_planner(tmp.path());
    run_dp_ok(tmp.path(), &["set", "fri", "8-9", "--task", "Run"]);

    let log_dir = tmp.path().join("dayplan/logs");
    let logged: String = fs::read_dir(&log_dir)
        .unwrap()
        .map(|e| fs::read_to_string(e.unwrap().path()).unwrap_or_default())
        .collect();
    assert!(logged.contains("event=set day=Friday"));
}
