//! Names exempted from YAML-driven overrides.

use std::collections::BTreeSet;
use std::ops::{Deref, DerefMut};

use crate::store::FlagStore;

/// Tag that exempts a flag from configuration document population.
pub const YAML_IGNORE_TAG: &str = "ignore-yaml";

/// Set of flag names that configuration documents may not override.
///
/// Each [`FlagStore`] owns one. Registration adds every flag tagged
/// [`YAML_IGNORE_TAG`]; names can also be marked directly, including names
/// of nested document sections.
///
/// # Examples
///
/// ```
/// use flagstack::IgnoreSet;
///
/// let mut ignored = IgnoreSet::new();
/// ignored.mark_ignored("database.password");
/// assert!(ignored.is_ignored("database.password"));
/// assert!(!ignored.is_ignored("database.host"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreSet {
    names: BTreeSet<String>,
}

impl IgnoreSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Exempts `name` from document population.
    pub fn mark_ignored(&mut self, name: &str) {
        self.names.insert(name.to_string());
    }

    /// Returns true if `name` has been marked.
    #[must_use]
    pub fn is_ignored(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Number of marked names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if nothing is marked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Marked names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

/// Guard that holds a replacement [`IgnoreSet`] in a store.
///
/// Created by [`FlagStore::scoped_ignore_set`]. The store's original set is
/// put back when the guard drops, on normal exit and during unwinding alike.
/// The guard dereferences to the store so it can be used in its place.
pub struct ScopedIgnoreSet<'a> {
    store: &'a mut FlagStore,
    saved: Option<IgnoreSet>,
}

impl<'a> ScopedIgnoreSet<'a> {
    pub(crate) fn new(store: &'a mut FlagStore, replacement: IgnoreSet) -> Self {
        let saved = store.replace_ignore_set(replacement);
        Self {
            store,
            saved: Some(saved),
        }
    }
}

impl Deref for ScopedIgnoreSet<'_> {
    type Target = FlagStore;

    fn deref(&self) -> &FlagStore {
        self.store
    }
}

impl DerefMut for ScopedIgnoreSet<'_> {
    fn deref_mut(&mut self) -> &mut FlagStore {
        self.store
    }
}

impl Drop for ScopedIgnoreSet<'_> {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take() {
            self.store.replace_ignore_set(saved);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    #[test]
    fn test_mark_and_query() {
        let mut set = IgnoreSet::new();
        assert!(set.is_empty());
        set.mark_ignored("bool");
        set.mark_ignored("bool");
        assert_eq!(set.len(), 1);
        assert!(set.is_ignored("bool"));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["bool"]);
    }

    #[test]
    fn test_scoped_set_is_restored() {
        let mut store = FlagStore::new();
        store.mark_ignored("original");

        {
            let mut scoped = store.scoped_ignore_set(IgnoreSet::new());
            assert!(!scoped.ignore_set().is_ignored("original"));
            scoped.mark_ignored("temporary");
            assert!(scoped.ignore_set().is_ignored("temporary"));
        }

        assert!(store.ignore_set().is_ignored("original"));
        assert!(!store.ignore_set().is_ignored("temporary"));
    }

    #[test]
    fn test_scoped_set_is_restored_on_panic() {
        let mut store = FlagStore::new();
        store.mark_ignored("original");

        let result = catch_unwind(AssertUnwindSafe(|| {
            let mut scoped = store.scoped_ignore_set(IgnoreSet::new());
            scoped.mark_ignored("temporary");
            panic!("test failure inside scope");
        }));

        assert!(result.is_err());
        assert!(store.ignore_set().is_ignored("original"));
        assert!(!store.ignore_set().is_ignored("temporary"));
    }
}
