//! Command to print the effective configuration.

use crate::error::CliError;
use crate::utils::{load_store, require_file, GlobalOptions};
use clap::{Args, ValueEnum};
use flagstack::resolve_sources;
use std::path::PathBuf;

/// Output format for the effective configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// YAML mapping of flag name to value
    Yaml,
    /// Pretty-printed JSON object
    Json,
}

/// Resolve flags from the command line and a config file, then print them.
#[derive(Args)]
pub struct ResolveCommand {
    /// Schema declaring the flags
    #[arg(long, value_name = "FILE")]
    pub schema: PathBuf,

    /// YAML configuration file to apply
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "yaml")]
    pub format: OutputFormat,

    /// Print secret flags instead of redacting them
    #[arg(long)]
    pub show_secrets: bool,

    /// Flag arguments, e.g. `-- --port=8080`
    #[arg(last = true, value_name = "FLAG_ARGS")]
    pub flag_args: Vec<String>,
}

impl ResolveCommand {
    pub fn execute(self, _global: &GlobalOptions) -> Result<(), CliError> {
        let store = load_store(&self.schema)?;
        if let Some(config) = &self.config {
            require_file(config)?;
        }

        let parsed = resolve_sources(&store, self.flag_args, self.config.as_deref())?;
        if !parsed.positional.is_empty() {
            return Err(CliError::InvalidArguments(format!(
                "unexpected arguments: {}",
                parsed.positional.join(" ")
            )));
        }
        log::info!("{} flag(s) set on the command line", parsed.explicit.len());

        let config = store.effective_config(!self.show_secrets)?;
        let rendered = match self.format {
            OutputFormat::Yaml => serde_yaml::to_string(&config).map_err(flagstack::Error::from)?,
            OutputFormat::Json => serde_json::to_string_pretty(&config)
                .map_err(|e| CliError::SemanticFailure(format!("cannot render JSON: {e}")))?,
        };
        println!("{}", rendered.trim_end());
        Ok(())
    }
}
