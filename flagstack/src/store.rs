//! Flag registration and storage.
//!
//! A [`FlagStore`] owns every registered flag. Registration deep-copies the
//! caller's default into an immutable snapshot and a separate current-value
//! cell, and hands back a [`FlagHandle`] that reads the cell.
//!
//! Stores are plain values: a binary builds one at startup and passes it by
//! reference to every registration and resolution call, and each test builds
//! its own.
//!
//! # Examples
//!
//! ```
//! use flagstack::{set_value_for_flag_name, ExplicitOverrides, FlagStore};
//!
//! let mut store = FlagStore::new();
//! let hosts = store
//!     .register("hosts", &vec!["a".to_string()], "Upstream hosts", &[])
//!     .unwrap();
//!
//! let value = serde_yaml::from_str("[b]").unwrap();
//! set_value_for_flag_name(&store, "hosts", value, &ExplicitOverrides::new(), true).unwrap();
//! assert_eq!(hosts.value(), vec!["a".to_string(), "b".to_string()]);
//! ```

use std::any::Any;
use std::cell::{Ref, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::Rc;

use serde_yaml::{Mapping, Value};

use crate::error::{Error, Result};
use crate::ignore::{IgnoreSet, ScopedIgnoreSet, YAML_IGNORE_TAG};
use crate::resolver;
use crate::value::{describe, FlagKind, FlagType};

/// Tag marking a flag whose value must not be printed.
pub const SECRET_TAG: &str = "secret";

/// Tag marking a flag that logs a warning whenever it is overridden.
pub const DEPRECATED_TAG: &str = "deprecated";

/// Placeholder printed instead of a secret flag's value.
pub const REDACTED: &str = "<redacted>";

/// Type-erased access to a flag's default snapshot and current cell.
///
/// Implemented once, by [`TypedCell`], so the per-type clone and merge
/// operations are fixed when the flag is registered.
pub(crate) trait ErasedCell {
    fn type_name(&self) -> &'static str;
    fn is_bool(&self) -> bool;
    fn resolve(&self, kind: FlagKind, value: Value, append: bool) -> Result<()>;
    fn parse_args(&self, raws: &[String]) -> Result<Box<dyn Any>>;
    fn commit_args(&self, parsed: Box<dyn Any>) -> Result<()>;
    fn is_borrowed(&self) -> bool;
    fn current_value(&self) -> Result<Value>;
    fn default_value(&self) -> Result<Value>;
    fn as_any(&self) -> &dyn Any;
}

struct TypedCell<T> {
    name: String,
    default: T,
    current: Rc<RefCell<T>>,
}

impl<T: FlagType> TypedCell<T> {
    fn store(&self, value: T) -> Result<()> {
        let mut current = self
            .current
            .try_borrow_mut()
            .map_err(|_| Error::FlagBorrowed {
                name: self.name.clone(),
            })?;
        *current = value;
        Ok(())
    }
}

impl<T: FlagType> ErasedCell for TypedCell<T> {
    fn type_name(&self) -> &'static str {
        T::type_name()
    }

    fn is_bool(&self) -> bool {
        T::IS_BOOL
    }

    fn resolve(&self, kind: FlagKind, value: Value, append: bool) -> Result<()> {
        if !kind.accepts(&value) {
            return Err(Error::kind_mismatch(&self.name, kind, describe(&value)));
        }
        let incoming: T = serde_yaml::from_value(value)
            .map_err(|e| Error::mismatch(&self.name, T::type_name(), e.to_string()))?;
        self.store(resolver::merge(kind, &self.default, incoming, append))
    }

    fn parse_args(&self, raws: &[String]) -> Result<Box<dyn Any>> {
        let mut parsed: Option<T> = None;
        for raw in raws {
            let value = T::parse_arg(raw).map_err(|reason| Error::InvalidArgument {
                name: self.name.clone(),
                value: raw.clone(),
                reason,
            })?;
            parsed = Some(match parsed {
                Some(previous) => previous.concat(value),
                None => value,
            });
        }
        parsed
            .map(|value| Box::new(value) as Box<dyn Any>)
            .ok_or_else(|| Error::MissingArgumentValue {
                name: self.name.clone(),
            })
    }

    fn commit_args(&self, parsed: Box<dyn Any>) -> Result<()> {
        let value = parsed
            .downcast::<T>()
            .map_err(|_| Error::mismatch(&self.name, T::type_name(), "command-line value"))?;
        self.store(*value)
    }

    fn is_borrowed(&self) -> bool {
        self.current.try_borrow_mut().is_err()
    }

    fn current_value(&self) -> Result<Value> {
        let current = self.current.try_borrow().map_err(|_| Error::FlagBorrowed {
            name: self.name.clone(),
        })?;
        Ok(serde_yaml::to_value(&*current)?)
    }

    fn default_value(&self) -> Result<Value> {
        Ok(serde_yaml::to_value(&self.default)?)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A registered flag.
pub struct FlagDefinition {
    name: String,
    kind: FlagKind,
    usage: String,
    tags: BTreeSet<String>,
    pub(crate) cell: Box<dyn ErasedCell>,
}

impl FlagDefinition {
    /// The flag's unique name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The kind fixed at registration.
    #[must_use]
    pub fn kind(&self) -> FlagKind {
        self.kind
    }

    /// Help text given at registration.
    #[must_use]
    pub fn usage(&self) -> &str {
        &self.usage
    }

    /// Name of the backing Rust type as shown to users.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.cell.type_name()
    }

    /// Tags given at registration, sorted.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    /// Returns true if the flag was registered with `tag`.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Whether the flag is a boolean.
    #[must_use]
    pub fn is_bool(&self) -> bool {
        self.cell.is_bool()
    }

    /// The current value rendered as YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be serialized.
    pub fn current_value(&self) -> Result<Value> {
        self.cell.current_value()
    }

    /// The registered default rendered as YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be serialized.
    pub fn default_value(&self) -> Result<Value> {
        self.cell.default_value()
    }
}

impl fmt::Debug for FlagDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlagDefinition")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("type", &self.type_name())
            .field("tags", &self.tags)
            .finish_non_exhaustive()
    }
}

/// Stable reference to a flag's current value.
///
/// Every read reflects the latest resolved value. Handles are cheap to clone
/// and share the same cell.
pub struct FlagHandle<T> {
    name: String,
    cell: Rc<RefCell<T>>,
}

impl<T: FlagType> FlagHandle<T> {
    /// The flag's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Borrows the current value.
    ///
    /// Resolution calls made while the returned guard is alive fail with
    /// [`Error::FlagBorrowed`].
    #[must_use]
    pub fn get(&self) -> Ref<'_, T> {
        self.cell.borrow()
    }

    /// Returns a copy of the current value.
    #[must_use]
    pub fn value(&self) -> T {
        self.cell.borrow().clone()
    }
}

impl<T> Clone for FlagHandle<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            cell: Rc::clone(&self.cell),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for FlagHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlagHandle")
            .field("name", &self.name)
            .field("value", &self.cell)
            .finish()
    }
}

/// Registry of flags, keyed by name.
#[derive(Default)]
pub struct FlagStore {
    flags: BTreeMap<String, FlagDefinition>,
    ignored: IgnoreSet,
}

impl FlagStore {
    /// Creates an empty store with an empty ignore set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a flag and returns a handle to its current value.
    ///
    /// `default` is cloned twice: once into the immutable default snapshot and
    /// once into the current-value cell. Later changes to the caller's
    /// variable are not seen by the store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateFlag`] if `name` is already registered; the
    /// store is left unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use flagstack::FlagStore;
    ///
    /// let mut store = FlagStore::new();
    /// let mut ports = vec![1, 2];
    /// let handle = store.register("ports", &ports, "", &[]).unwrap();
    /// ports.push(3);
    /// assert_eq!(handle.value(), vec![1, 2]);
    ///
    /// assert!(store.register("ports", &ports, "", &[]).is_err());
    /// ```
    pub fn register<T: FlagType>(
        &mut self,
        name: &str,
        default: &T,
        usage: &str,
        tags: &[&str],
    ) -> Result<FlagHandle<T>> {
        if self.flags.contains_key(name) {
            return Err(Error::DuplicateFlag {
                name: name.to_string(),
            });
        }

        let snapshot = default.clone();
        let current = Rc::new(RefCell::new(snapshot.clone()));
        let tags: BTreeSet<String> = tags.iter().map(|tag| (*tag).to_string()).collect();

        if tags.contains(YAML_IGNORE_TAG) {
            self.ignored.mark_ignored(name);
        }

        let definition = FlagDefinition {
            name: name.to_string(),
            kind: T::KIND,
            usage: usage.to_string(),
            tags,
            cell: Box::new(TypedCell {
                name: name.to_string(),
                default: snapshot,
                current: Rc::clone(&current),
            }),
        };
        self.flags.insert(name.to_string(), definition);
        log::debug!("registered flag {name} ({}, {})", T::type_name(), T::KIND);

        Ok(FlagHandle {
            name: name.to_string(),
            cell: current,
        })
    }

    /// Returns a new handle to an already registered flag.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownFlag`] if `name` is not registered, or
    /// [`Error::TypeMismatch`] if it was registered with a different type.
    pub fn handle<T: FlagType>(&self, name: &str) -> Result<FlagHandle<T>> {
        let definition = self.lookup(name)?;
        definition
            .cell
            .as_any()
            .downcast_ref::<TypedCell<T>>()
            .map(|cell| FlagHandle {
                name: name.to_string(),
                cell: Rc::clone(&cell.current),
            })
            .ok_or_else(|| Error::mismatch(name, definition.type_name(), T::type_name()))
    }

    /// Looks up a flag, failing with [`Error::UnknownFlag`].
    pub(crate) fn lookup(&self, name: &str) -> Result<&FlagDefinition> {
        self.flags.get(name).ok_or_else(|| Error::UnknownFlag {
            name: name.to_string(),
        })
    }

    /// Returns the definition registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FlagDefinition> {
        self.flags.get(name)
    }

    /// Returns true if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.flags.contains_key(name)
    }

    /// Returns true if some registered name starts with `prefix.`.
    pub(crate) fn has_section(&self, prefix: &str) -> bool {
        let start = format!("{prefix}.");
        self.flags
            .range(start.clone()..)
            .next()
            .is_some_and(|(name, _)| name.starts_with(&start))
    }

    /// The kind `name` was registered with.
    #[must_use]
    pub fn kind(&self, name: &str) -> Option<FlagKind> {
        self.flags.get(name).map(FlagDefinition::kind)
    }

    /// Number of registered flags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Returns true if no flag is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.flags.keys().map(String::as_str)
    }

    /// Registered definitions in name order.
    pub fn definitions(&self) -> impl Iterator<Item = &FlagDefinition> {
        self.flags.values()
    }

    /// The store's ignore set.
    #[must_use]
    pub fn ignore_set(&self) -> &IgnoreSet {
        &self.ignored
    }

    /// Exempts `name` from configuration document population.
    pub fn mark_ignored(&mut self, name: &str) {
        self.ignored.mark_ignored(name);
    }

    /// Returns true if documents may not override `name`, either because it
    /// is in the ignore set or because it was registered with
    /// [`YAML_IGNORE_TAG`].
    #[must_use]
    pub fn is_yaml_ignored(&self, name: &str) -> bool {
        self.ignored.is_ignored(name)
            || self
                .flags
                .get(name)
                .is_some_and(|flag| flag.has_tag(YAML_IGNORE_TAG))
    }

    /// Swaps in `replacement` as the ignore set until the returned guard drops.
    ///
    /// # Examples
    ///
    /// ```
    /// use flagstack::{FlagStore, IgnoreSet};
    ///
    /// let mut store = FlagStore::new();
    /// {
    ///     let mut scoped = store.scoped_ignore_set(IgnoreSet::new());
    ///     scoped.mark_ignored("temporary");
    /// }
    /// assert!(!store.ignore_set().is_ignored("temporary"));
    /// ```
    pub fn scoped_ignore_set(&mut self, replacement: IgnoreSet) -> ScopedIgnoreSet<'_> {
        ScopedIgnoreSet::new(self, replacement)
    }

    pub(crate) fn replace_ignore_set(&mut self, replacement: IgnoreSet) -> IgnoreSet {
        std::mem::replace(&mut self.ignored, replacement)
    }

    /// Renders every flag's current value, keyed by name.
    ///
    /// With `redact_secrets`, flags tagged [`SECRET_TAG`] render as
    /// [`REDACTED`].
    ///
    /// # Errors
    ///
    /// Returns an error if a value cannot be serialized or is borrowed.
    pub fn effective_config(&self, redact_secrets: bool) -> Result<Mapping> {
        let mut config = Mapping::new();
        for flag in self.flags.values() {
            let value = if redact_secrets && flag.has_tag(SECRET_TAG) {
                Value::String(REDACTED.to_string())
            } else {
                flag.current_value()?
            };
            config.insert(Value::String(flag.name.clone()), value);
        }
        Ok(config)
    }

    /// Renders help text for every flag, one entry per flag in name order.
    #[must_use]
    pub fn usage_text(&self) -> String {
        let mut text = String::new();
        for flag in self.flags.values() {
            let default = if flag.has_tag(SECRET_TAG) {
                REDACTED.to_string()
            } else {
                flag.default_value()
                    .ok()
                    .and_then(|value| serde_json::to_string(&value).ok())
                    .unwrap_or_default()
            };
            text.push_str(&format!("  --{} {}\n", flag.name, flag.type_name()));
            text.push_str(&format!("    \t{} (default {default})\n", flag.usage));
            if !flag.tags.is_empty() {
                let tags: Vec<&str> = flag.tags().collect();
                text.push_str(&format!("    \ttags: {}\n", tags.join(", ")));
            }
        }
        text
    }
}

impl fmt::Debug for FlagStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlagStore")
            .field("flags", &self.flags.values().collect::<Vec<_>>())
            .field("ignored", &self.ignored)
            .finish()
    }
}
