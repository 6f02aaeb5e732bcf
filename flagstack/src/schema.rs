//! Declarative flag definitions.
//!
//! A schema is a YAML document listing flags to register, for programs that
//! do not define their flags in code:
//!
//! ```yaml
//! flags:
//!   - name: app.port
//!     type: uint
//!     default: 8080
//!     usage: Port to listen on
//!   - name: app.admins
//!     type: string_list
//!     default: [root]
//!     tags: [ignore-yaml]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use url::Url;

use crate::error::{Error, Result};
use crate::store::FlagStore;
use crate::value::FlagType;

/// A list of flag definitions.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FlagSchema {
    /// Flags in registration order.
    #[serde(default)]
    pub flags: Vec<FlagSpec>,
}

/// One flag definition.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FlagSpec {
    /// Unique flag name.
    pub name: String,

    /// Value type.
    #[serde(rename = "type")]
    pub value_type: SchemaType,

    /// Default value; the type's zero value when absent.
    #[serde(default)]
    pub default: Option<Value>,

    /// Help text.
    #[serde(default)]
    pub usage: String,

    /// Tags such as `ignore-yaml` or `secret`.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Value types a schema can declare.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SchemaType {
    /// `bool`
    Bool,
    /// `i64`
    Int,
    /// `u64`
    Uint,
    /// `f64`
    Float,
    /// `String`
    String,
    /// `PathBuf`
    Path,
    /// `url::Url`; requires a default.
    Url,
    /// `Vec<String>`
    StringList,
    /// `Vec<i64>`
    IntList,
    /// `Vec<u64>`
    UintList,
    /// `Vec<f64>`
    FloatList,
    /// A single mapping.
    Record,
    /// `Vec` of mappings.
    RecordList,
}

impl FlagSchema {
    /// Parses a schema from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if the text is not a valid schema.
    ///
    /// # Examples
    ///
    /// ```
    /// use flagstack::{FlagSchema, FlagStore};
    ///
    /// let schema = FlagSchema::from_yaml("flags:\n  - {name: port, type: uint, default: 80}\n").unwrap();
    /// let mut store = FlagStore::new();
    /// schema.register_all(&mut store).unwrap();
    /// assert_eq!(store.handle::<u64>("port").unwrap().value(), 80);
    /// ```
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Reads and parses a schema file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigFile`] if the file cannot be read, or
    /// [`Error::Parse`] if it is not a valid schema.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::ConfigFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    /// Registers every flag in the schema.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] for a default that does not fit its type and
    /// [`Error::DuplicateFlag`] for a repeated name. Flags before the failing
    /// entry stay registered.
    pub fn register_all(&self, store: &mut FlagStore) -> Result<()> {
        for spec in &self.flags {
            spec.register(store)?;
        }
        Ok(())
    }
}

impl FlagSpec {
    /// Registers this flag with the Rust type matching [`SchemaType`].
    ///
    /// # Errors
    ///
    /// See [`FlagSchema::register_all`].
    pub fn register(&self, store: &mut FlagStore) -> Result<()> {
        match self.value_type {
            SchemaType::Bool => self.register_as::<bool>(store),
            SchemaType::Int => self.register_as::<i64>(store),
            SchemaType::Uint => self.register_as::<u64>(store),
            SchemaType::Float => self.register_as::<f64>(store),
            SchemaType::String => self.register_as::<String>(store),
            SchemaType::Path => self.register_as::<PathBuf>(store),
            SchemaType::Url => self.register_required::<Url>(store),
            SchemaType::StringList => self.register_as::<Vec<String>>(store),
            SchemaType::IntList => self.register_as::<Vec<i64>>(store),
            SchemaType::UintList => self.register_as::<Vec<u64>>(store),
            SchemaType::FloatList => self.register_as::<Vec<f64>>(store),
            SchemaType::Record => self.register_as::<Mapping>(store),
            SchemaType::RecordList => self.register_as::<Vec<Mapping>>(store),
        }
    }

    fn register_as<T: FlagType + Default>(&self, store: &mut FlagStore) -> Result<()> {
        let default = self.decode_default::<T>()?.unwrap_or_default();
        self.register_with(store, &default)
    }

    /// Registers a type with no natural zero value.
    fn register_required<T: FlagType>(&self, store: &mut FlagStore) -> Result<()> {
        let default = self.decode_default::<T>()?.ok_or_else(|| Error::Schema {
            name: self.name.clone(),
            message: format!("type {} needs a default", T::type_name()),
        })?;
        self.register_with(store, &default)
    }

    fn decode_default<T: FlagType>(&self) -> Result<Option<T>> {
        self.default
            .clone()
            .map(|value| {
                serde_yaml::from_value(value).map_err(|e| Error::Schema {
                    name: self.name.clone(),
                    message: format!("default does not fit type {}: {e}", T::type_name()),
                })
            })
            .transpose()
    }

    fn register_with<T: FlagType>(&self, store: &mut FlagStore, default: &T) -> Result<()> {
        let tags: Vec<&str> = self.tags.iter().map(String::as_str).collect();
        store.register(&self.name, default, &self.usage, &tags)?;
        Ok(())
    }
}
