//! CLI command implementations.
//!
//! - `resolve`: Print the effective configuration
//! - `check`: Check a configuration file against a schema
//! - `describe`: Print help for every flag in a schema

pub mod check;
pub mod describe;
pub mod resolve;

pub use check::CheckCommand;
pub use describe::DescribeCommand;
pub use resolve::ResolveCommand;
