//! Utility functions shared by CLI commands.

use crate::error::CliError;
use flagstack::{FlagSchema, FlagStore};
use std::path::Path;

/// Global CLI options shared across all commands.
///
/// `--verbose` only affects the logger, which `main` installs before dispatch.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    /// Suppress non-essential output.
    pub quiet: bool,
}

/// Fail with an argument error if `path` does not exist.
pub fn require_file(path: &Path) -> Result<(), CliError> {
    if path.exists() {
        Ok(())
    } else {
        Err(CliError::InvalidArguments(format!(
            "File not found: {}",
            path.display()
        )))
    }
}

/// Build a store holding every flag declared in the schema file.
pub fn load_store(schema_path: &Path) -> Result<FlagStore, CliError> {
    require_file(schema_path)?;

    let schema =
        FlagSchema::from_file(schema_path).map_err(|e| CliError::Config(e.to_string()))?;
    let mut store = FlagStore::new();
    schema
        .register_all(&mut store)
        .map_err(|e| CliError::Config(e.to_string()))?;

    log::info!(
        "registered {} flag(s) from {}",
        store.len(),
        schema_path.display()
    );
    Ok(store)
}
