//! Layered resolution across all sources.
//!
//! Precedence, highest first:
//!
//! 1. Command-line flags
//! 2. YAML configuration file
//! 3. Defaults given at registration
//!
//! Resolution must finish before anything reads flag handles.

use std::path::{Path, PathBuf};

use crate::args::{parse_flag_args, ParsedArgs};
use crate::error::Result;
use crate::store::FlagStore;
use crate::yaml::populate_flags_from_file;

/// Name of the string flag consulted for a configuration file path when none
/// is passed explicitly.
pub const CONFIG_FILE_FLAG: &str = "config_file";

/// Runs the command-line pass and then the configuration file pass.
///
/// The file is `config_path` if given, otherwise the value of the
/// [`CONFIG_FILE_FLAG`] string flag if registered and non-empty. Flags set on
/// the command line are not overridden by the file.
///
/// # Errors
///
/// Returns the first failing pass's error. A command-line error stops before
/// the file is read.
///
/// # Examples
///
/// ```no_run
/// use flagstack::{resolve_sources, FlagStore, CONFIG_FILE_FLAG};
///
/// let mut store = FlagStore::new();
/// store.register(CONFIG_FILE_FLAG, &String::new(), "Path to a YAML config file", &[]).unwrap();
/// let port = store.register("port", &80_u32, "", &[]).unwrap();
///
/// resolve_sources(&store, std::env::args().skip(1), None).unwrap();
/// println!("listening on {}", port.value());
/// ```
pub fn resolve_sources<I, S>(
    store: &FlagStore,
    args: I,
    config_path: Option<&Path>,
) -> Result<ParsedArgs>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let parsed = parse_flag_args(store, args)?;

    let path = config_path
        .map(Path::to_path_buf)
        .or_else(|| config_file_from_flag(store));
    if let Some(path) = path {
        populate_flags_from_file(store, &parsed.explicit, &path)?;
    }

    Ok(parsed)
}

fn config_file_from_flag(store: &FlagStore) -> Option<PathBuf> {
    let value = store.handle::<String>(CONFIG_FILE_FLAG).ok()?.value();
    if value.is_empty() {
        None
    } else {
        Some(PathBuf::from(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_command_line_beats_file() {
        let temp_dir = TempDir::new().unwrap();
        let config = temp_dir.path().join("config.yaml");
        fs::write(&config, "port: 9090\nhosts: [b]\n").unwrap();

        let mut store = FlagStore::new();
        let port = store.register("port", &80_u32, "", &[]).unwrap();
        let hosts = store
            .register("hosts", &vec!["a".to_string()], "", &[])
            .unwrap();

        let parsed = resolve_sources(&store, ["--port=7070"], Some(&config)).unwrap();

        assert_eq!(port.value(), 7070);
        assert_eq!(hosts.value(), vec!["a", "b"]);
        assert!(parsed.explicit.contains("port"));
        assert!(!parsed.explicit.contains("hosts"));
    }

    #[test]
    fn test_config_file_flag_is_used() {
        let temp_dir = TempDir::new().unwrap();
        let config = temp_dir.path().join("flags.yaml");
        fs::write(&config, "port: 9090\n").unwrap();

        let mut store = FlagStore::new();
        store
            .register(CONFIG_FILE_FLAG, &String::new(), "", &[])
            .unwrap();
        let port = store.register("port", &80_u32, "", &[]).unwrap();

        let arg = format!("--config_file={}", config.display());
        resolve_sources(&store, [arg], None).unwrap();
        assert_eq!(port.value(), 9090);
    }

    #[test]
    fn test_no_config_file() {
        let mut store = FlagStore::new();
        store
            .register(CONFIG_FILE_FLAG, &String::new(), "", &[])
            .unwrap();
        let port = store.register("port", &80_u32, "", &[]).unwrap();

        resolve_sources(&store, Vec::<String>::new(), None).unwrap();
        assert_eq!(port.value(), 80);
    }

    #[test]
    fn test_bad_argument_skips_file() {
        let mut store = FlagStore::new();
        let port = store.register("port", &80_u32, "", &[]).unwrap();

        let err = resolve_sources(
            &store,
            ["--port=x"],
            Some(Path::new("/nonexistent/config.yaml")),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
        assert_eq!(port.value(), 80);
    }
}
