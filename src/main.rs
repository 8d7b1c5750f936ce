use std::process::ExitCode;

use clap::Parser;

use closeboard::cli::commands::{Cli, Commands};
use closeboard::cli::handlers;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Bare `cb` opens the board. Init runs before workspace discovery;
    // every other subcommand goes through the dispatcher, which discovers
    // the workspace itself.
    let result = match cli.command {
        None => closeboard::tui::run(cli.workspace_dir.as_deref()),
        Some(Commands::Init(args)) => handlers::cmd_init(args),
        Some(_) => handlers::dispatch(cli),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
