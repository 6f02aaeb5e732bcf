//! Population of flags from YAML configuration documents.
//!
//! A configuration document is a mapping from flag name to value. Nested
//! mappings address dotted flag names, so these two documents are
//! equivalent:
//!
//! ```yaml
//! app.port: 8080
//! ```
//!
//! ```yaml
//! app:
//!   port: 8080
//! ```
//!
//! Every key is resolved in append mode: list-valued flags get the document's
//! elements after their defaults.

use std::fs;
use std::path::Path;

use serde_yaml::{Mapping, Value};

use crate::error::{Error, Result};
use crate::resolver::{set_value_for_flag_name, ExplicitOverrides};
use crate::store::FlagStore;

/// Populates flags from the text of a YAML document.
///
/// Keys are applied in document order. Flags tagged
/// [`YAML_IGNORE_TAG`](crate::YAML_IGNORE_TAG) and names in the store's ignore
/// set are skipped. Flags in `explicit` keep their values.
///
/// # Errors
///
/// - [`Error::Parse`] or [`Error::InvalidDocument`] if the text is not a YAML
///   mapping; no flag is touched
/// - [`Error::Populate`] with every per-key error, after all keys have been
///   attempted; keys that applied cleanly stay applied
///
/// # Examples
///
/// ```
/// use flagstack::{populate_flags_from_data, ExplicitOverrides, FlagStore};
///
/// let mut store = FlagStore::new();
/// let port = store.register("app.port", &80_u32, "", &[]).unwrap();
///
/// populate_flags_from_data(&store, &ExplicitOverrides::new(), "app:\n  port: 8080\n").unwrap();
/// assert_eq!(port.value(), 8080);
/// ```
pub fn populate_flags_from_data(
    store: &FlagStore,
    explicit: &ExplicitOverrides,
    data: &str,
) -> Result<()> {
    let document: Value = serde_yaml::from_str(data)?;
    let mapping = match document {
        Value::Null => return Ok(()),
        Value::Mapping(mapping) => mapping,
        other => {
            return Err(Error::InvalidDocument {
                reason: format!(
                    "expected a mapping of flag names, found {}",
                    crate::value::describe(&other)
                ),
            })
        }
    };

    let mut errors = Vec::new();
    populate_mapping(store, explicit, "", mapping, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        log::debug!("{} key(s) failed to populate", errors.len());
        Err(Error::Populate { errors })
    }
}

/// Reads a YAML file and populates flags from it.
///
/// # Errors
///
/// Returns [`Error::ConfigFile`] if the file cannot be read, and otherwise
/// the errors of [`populate_flags_from_data`].
pub fn populate_flags_from_file(
    store: &FlagStore,
    explicit: &ExplicitOverrides,
    path: &Path,
) -> Result<()> {
    let data = fs::read_to_string(path).map_err(|source| Error::ConfigFile {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("populating flags from {}", path.display());
    populate_flags_from_data(store, explicit, &data)
}

fn populate_mapping(
    store: &FlagStore,
    explicit: &ExplicitOverrides,
    prefix: &str,
    mapping: Mapping,
    errors: &mut Vec<Error>,
) {
    for (key, value) in mapping {
        let Some(key) = key.as_str() else {
            errors.push(Error::InvalidKey {
                key: format!("{key:?}"),
            });
            continue;
        };
        let name = if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{prefix}.{key}")
        };

        if store.is_yaml_ignored(&name) {
            log::debug!("skipping ignored flag {name}");
            continue;
        }

        match value {
            Value::Mapping(nested) if !store.contains(&name) => {
                if nested.is_empty() || !store.has_section(&name) {
                    errors.push(Error::UnknownFlag { name });
                } else {
                    populate_mapping(store, explicit, &name, nested, errors);
                }
            }
            value => {
                if let Err(err) = set_value_for_flag_name(store, &name, value, explicit, true) {
                    errors.push(err);
                }
            }
        }
    }
}
