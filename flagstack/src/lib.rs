#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # flagstack
//!
//! Typed flags with layered overrides.
//!
//! Flags are registered in a [`FlagStore`] with a default value. Their values
//! can then be overridden from the command line and from YAML configuration
//! documents, in that order of precedence.
//!
//! ## Core Types
//!
//! - [`FlagStore`], [`FlagHandle`] and [`FlagDefinition`]: registration and access
//! - [`FlagKind`] and [`FlagType`]: the shapes a flag's value can take
//! - [`IgnoreSet`] and [`ScopedIgnoreSet`]: flags exempt from documents
//! - [`FlagSchema`]: flags declared in YAML instead of code
//! - [`Error`] and [`Result`]: error handling types
//! - [`Logger`] and [`LogLevel`]: logging for binaries
//!
//! ## Examples
//!
//! ```
//! use flagstack::{parse_flag_args, populate_flags_from_data, FlagStore};
//!
//! let mut store = FlagStore::new();
//! let port = store.register("port", &80_u32, "Port to listen on", &[]).unwrap();
//! let hosts = store
//!     .register("hosts", &vec!["localhost".to_string()], "Upstream hosts", &[])
//!     .unwrap();
//!
//! let parsed = parse_flag_args(&store, ["--port=8080"]).unwrap();
//! populate_flags_from_data(&store, &parsed.explicit, "port: 9090\nhosts: [db]\n").unwrap();
//!
//! assert_eq!(port.value(), 8080);
//! assert_eq!(hosts.value(), vec!["localhost", "db"]);
//! ```

pub mod args;
pub mod error;
pub mod ignore;
pub mod logging;
pub mod resolver;
pub mod schema;
pub mod source;
pub mod store;
pub mod value;
pub mod yaml;

#[cfg(test)]
mod proptests;

// Re-export key types at crate root for convenience
pub use args::{parse_flag_args, ParsedArgs};
pub use error::{Error, Result};
pub use ignore::{IgnoreSet, ScopedIgnoreSet, YAML_IGNORE_TAG};
pub use logging::{init_logger, LogLevel, Logger, LOG_MODE_ENV};
pub use resolver::{set_typed_value_for_flag_name, set_value_for_flag_name, ExplicitOverrides};
pub use schema::{FlagSchema, FlagSpec, SchemaType};
pub use source::{resolve_sources, CONFIG_FILE_FLAG};
pub use store::{FlagDefinition, FlagHandle, FlagStore, DEPRECATED_TAG, REDACTED, SECRET_TAG};
pub use value::{FlagElement, FlagKind, FlagType};
pub use yaml::{populate_flags_from_data, populate_flags_from_file};
