//! Library exports for flagstack-cli.
//!
//! Exposes the CLI structure for documentation tooling.

pub mod cli;
pub mod commands;
pub mod error;
pub mod utils;

pub use cli::Cli;
