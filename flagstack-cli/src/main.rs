//! Main entry point for the flagstack CLI.
//!
//! - `resolve`: Print the effective configuration
//! - `check`: Check a configuration file against a schema
//! - `describe`: Print help for every flag in a schema

mod cli;
mod commands;
mod error;
mod utils;

use clap::Parser;
use cli::Cli;
use utils::GlobalOptions;

fn main() {
    let cli = Cli::parse();

    let logger = flagstack::init_logger(cli.verbose, cli.quiet);
    if let Err(e) = logger.install() {
        eprintln!("WARN: logging unavailable: {e}");
    }

    let global = GlobalOptions { quiet: cli.quiet };

    let result = match cli.command {
        cli::Command::Resolve(cmd) => cmd.execute(&global),
        cli::Command::Check(cmd) => cmd.execute(&global),
        cli::Command::Describe(cmd) => cmd.execute(&global),
    };

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
