use clap::Parser;
use dayplan::cli::commands::{Cli, Commands};
use dayplan::cli::handlers;

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        // Init is handled before planner discovery
        Commands::Init(args) => handlers::cmd_init(args),
        _ => handlers::dispatch(cli),
    };
    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
