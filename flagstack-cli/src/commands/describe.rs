//! Command to print help for the flags in a schema.

use crate::error::CliError;
use crate::utils::{load_store, GlobalOptions};
use clap::Args;
use std::path::PathBuf;

/// Describe every flag declared in a schema.
#[derive(Args)]
pub struct DescribeCommand {
    /// Schema declaring the flags
    #[arg(long, value_name = "FILE")]
    pub schema: PathBuf,
}

impl DescribeCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let store = load_store(&self.schema)?;
        if !store.is_empty() {
            print!("{}", store.usage_text());
        } else if !global.quiet {
            println!("No flags declared");
        }
        Ok(())
    }
}
