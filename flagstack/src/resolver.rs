//! Override resolution for a single flag.
//!
//! [`set_value_for_flag_name`] is the one place a flag's current value changes
//! after registration, apart from the command-line pass. It applies the merge
//! strategy for the flag's kind:
//!
//! | kind                      | append = true        | append = false |
//! |---------------------------|----------------------|----------------|
//! | Scalar                    | replace              | replace        |
//! | Sequence / StructSequence | default ++ new value | replace        |
//!
//! Append always starts from the registered default, not from the current
//! value, so repeating the same append call gives the same result.

use std::collections::HashSet;

use serde_yaml::Value;

use crate::error::Result;
use crate::store::{FlagStore, DEPRECATED_TAG};
use crate::value::{FlagKind, FlagType};

/// Names of flags already set by a higher-precedence source.
pub type ExplicitOverrides = HashSet<String>;

/// Computes a flag's new current value.
pub(crate) fn merge<T: FlagType>(kind: FlagKind, default: &T, incoming: T, append: bool) -> T {
    match kind {
        FlagKind::Sequence | FlagKind::StructSequence if append => default.clone().concat(incoming),
        FlagKind::Scalar | FlagKind::Sequence | FlagKind::StructSequence => incoming,
    }
}

/// Resolves `value` into the current value of flag `name`.
///
/// Does nothing if `name` is in `explicit`, whatever `value` holds.
///
/// # Errors
///
/// - [`Error::UnknownFlag`](crate::Error::UnknownFlag) if `name` is not registered
/// - [`Error::TypeMismatch`](crate::Error::TypeMismatch) if `value` does not have
///   the flag's kind or does not decode into its type
/// - [`Error::FlagBorrowed`](crate::Error::FlagBorrowed) if a handle guard is alive
///
/// The store is unchanged on error.
///
/// # Examples
///
/// ```
/// use flagstack::{set_value_for_flag_name, ExplicitOverrides, FlagStore};
///
/// let mut store = FlagStore::new();
/// let flag = store.register("ints", &vec![1, 2], "", &[]).unwrap();
///
/// let value: serde_yaml::Value = serde_yaml::from_str("[3]").unwrap();
/// set_value_for_flag_name(&store, "ints", value.clone(), &ExplicitOverrides::new(), false).unwrap();
/// assert_eq!(flag.value(), vec![3]);
///
/// set_value_for_flag_name(&store, "ints", value, &ExplicitOverrides::new(), true).unwrap();
/// assert_eq!(flag.value(), vec![1, 2, 3]);
/// ```
pub fn set_value_for_flag_name(
    store: &FlagStore,
    name: &str,
    value: Value,
    explicit: &ExplicitOverrides,
    append: bool,
) -> Result<()> {
    let flag = store.lookup(name)?;

    if explicit.contains(name) {
        log::debug!("flag {name} was set explicitly, ignoring new value");
        return Ok(());
    }

    flag.cell.resolve(flag.kind(), value, append)?;

    if flag.has_tag(DEPRECATED_TAG) {
        log::warn!("flag {name} is deprecated: {}", flag.usage());
    }
    log::debug!("resolved flag {name} (append: {append})");
    Ok(())
}

/// Resolves a typed Rust value into flag `name`.
///
/// The value is converted to its YAML form and goes through
/// [`set_value_for_flag_name`], so the same kind and type checks apply.
///
/// # Errors
///
/// Same as [`set_value_for_flag_name`], plus a parse error if `value` cannot
/// be serialized.
pub fn set_typed_value_for_flag_name<T: FlagType>(
    store: &FlagStore,
    name: &str,
    value: &T,
    explicit: &ExplicitOverrides,
    append: bool,
) -> Result<()> {
    let value = serde_yaml::to_value(value)?;
    set_value_for_flag_name(store, name, value, explicit, append)
}
