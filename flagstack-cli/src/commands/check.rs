//! Command to check a configuration file against a schema.

use crate::error::CliError;
use crate::utils::{load_store, require_file, GlobalOptions};
use clap::Args;
use flagstack::{populate_flags_from_file, Error, ExplicitOverrides};
use std::path::PathBuf;

/// Check that every key in a configuration file fits the schema.
#[derive(Args)]
pub struct CheckCommand {
    /// Schema declaring the flags
    #[arg(long, value_name = "FILE")]
    pub schema: PathBuf,

    /// Configuration file to check
    #[arg(long, value_name = "FILE")]
    pub config: PathBuf,
}

impl CheckCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let store = load_store(&self.schema)?;
        require_file(&self.config)?;

        match populate_flags_from_file(&store, &ExplicitOverrides::new(), &self.config) {
            Ok(()) => {
                if !global.quiet {
                    println!("Configuration is valid");
                }
                Ok(())
            }
            Err(Error::Populate { errors }) => {
                for error in &errors {
                    eprintln!("Validation error: {error}");
                }
                Err(CliError::SemanticFailure(format!(
                    "Configuration validation failed with {} error(s)",
                    errors.len()
                )))
            }
            Err(e @ (Error::Parse(_) | Error::InvalidDocument { .. })) => {
                eprintln!("Parse error: {e}");
                Err(CliError::SemanticFailure(
                    "Configuration file is invalid".to_string(),
                ))
            }
            Err(e) => Err(e.into()),
        }
    }
}
