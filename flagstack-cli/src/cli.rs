//! CLI structure and command definitions.

use crate::commands::{CheckCommand, DescribeCommand, ResolveCommand};
use clap::{Parser, Subcommand};

/// Command-line tool for resolving layered flag configuration.
#[derive(Parser)]
#[command(name = "flagstack")]
#[command(version, about = "Resolve typed flags from schemas, config files and arguments", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Command {
    /// Print the effective configuration
    Resolve(ResolveCommand),

    /// Check a configuration file against a schema
    Check(CheckCommand),

    /// Print help for every flag in a schema
    Describe(DescribeCommand),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_trailing_flag_args() {
        let cli = Cli::try_parse_from([
            "flagstack",
            "resolve",
            "--schema",
            "s.yaml",
            "--",
            "--port=1",
            "--verbose",
        ])
        .unwrap();

        assert!(!cli.verbose);
        match cli.command {
            Command::Resolve(cmd) => assert_eq!(cmd.flag_args, vec!["--port=1", "--verbose"]),
            _ => panic!("expected resolve"),
        }
    }
}
