use std::fs;

use crate::cli::commands::InitArgs;
use crate::io::config_io::config_path;
use crate::io::planner_io::{self, PLANNER_DIR};

const CONFIG_TOML_TEMPLATE: &str = r##"# dayplan configuration. Every key is optional.

[schedule]
# Size in minutes of the block `dp split` cuts off the front of a block.
# A fresh day always starts as 24 one-hour blocks.
base_unit = 60

[storage]
# The week is stored in dayplan/<key>.json. Change the key to start over
# without touching the old file.
key = "weekly-schedule-v1"

[log]
# flexi_logger spec; RUST_LOG overrides it. Logs go to dayplan/logs/.
level = "info"
# level = "warn, dayplan::ops=debug"
"##;

const GITIGNORE_TEMPLATE: &str = "logs/\n.lock\n";

pub fn cmd_init(args: InitArgs) -> Result<(), Box<dyn std::error::Error>> {
    let cwd = std::env::current_dir()?;
    let planner_dir = cwd.join(PLANNER_DIR);

    if planner_dir.is_dir() && !args.force {
        return Err("dayplan already exists in ./dayplan/ (use --force to rewrite config.toml)".into());
    }

    if let Some(parent) = cwd.parent()
        && let Ok(parent_root) = planner_io::discover_planner(parent)
    {
        eprintln!(
            "Note: parent planner found at {}/",
            parent_root.join(PLANNER_DIR).display()
        );
        eprintln!("Creating new planner in ./dayplan/");
    }

    fs::create_dir_all(&planner_dir)?;
    fs::write(config_path(&planner_dir), CONFIG_TOML_TEMPLATE)?;
    fs::write(planner_dir.join(".gitignore"), GITIGNORE_TEMPLATE)?;

    if args.force {
        println!("Rewrote dayplan/config.toml (schedule left as it was)");
    } else {
        println!("Initialized dayplan in {}", planner_dir.display());
    }
    Ok(())
}
