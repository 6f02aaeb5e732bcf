//! Error types for the flagstack library.
//!
//! Every failure in registration, resolution, or population is returned to
//! the caller as a value of [`Error`]. No operation leaves a flag definition
//! half-constructed.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::value::FlagKind;

/// Result type alias for operations that may fail with a flagstack error.
///
/// # Examples
///
/// ```
/// use flagstack::{Error, Result};
///
/// fn lookup() -> Result<u16> {
///     Err(Error::UnknownFlag { name: "port".to_string() })
/// }
///
/// assert!(lookup().is_err());
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the flagstack library.
#[derive(Debug, Error)]
pub enum Error {
    /// A flag with this name is already registered in the store.
    #[error("flag redefined: {name}")]
    DuplicateFlag {
        /// The name that was registered twice.
        name: String,
    },

    /// No flag with this name is registered in the store.
    #[error("undefined flag: {name}")]
    UnknownFlag {
        /// The name that was looked up.
        name: String,
    },

    /// The supplied value does not match the flag's registered kind or type.
    #[error("type mismatch for flag '{name}': expected {expected}, found {found}")]
    TypeMismatch {
        /// The flag being resolved.
        name: String,
        /// The registered type of the flag.
        expected: String,
        /// A description of the value that was supplied.
        found: String,
    },

    /// The configuration document could not be parsed.
    #[error("configuration parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The configuration document parsed but is not a mapping of flag names.
    #[error("configuration parse error: {reason}")]
    InvalidDocument {
        /// Why the document was rejected.
        reason: String,
    },

    /// One or more keys of a configuration document failed to apply.
    #[error("{} error(s) populating flags: {}", .errors.len(), JoinedErrors(.errors))]
    Populate {
        /// Per-key errors, in document order.
        errors: Vec<Error>,
    },

    /// A configuration document key is not a string.
    #[error("invalid configuration key: {key}")]
    InvalidKey {
        /// A rendering of the offending key.
        key: String,
    },

    /// A command-line value could not be parsed into the flag's type.
    #[error("invalid value \"{value}\" for flag -{name}: {reason}")]
    InvalidArgument {
        /// The flag being set.
        name: String,
        /// The raw value from the command line.
        value: String,
        /// The parse failure.
        reason: String,
    },

    /// A non-boolean flag was given on the command line without a value.
    #[error("flag needs an argument: -{name}")]
    MissingArgumentValue {
        /// The flag missing its value.
        name: String,
    },

    /// The flag's current value is borrowed through a handle and cannot be updated.
    #[error("flag '{name}' is borrowed and cannot be updated")]
    FlagBorrowed {
        /// The flag that is borrowed.
        name: String,
    },

    /// A configuration file could not be read.
    #[error("failed to read configuration file {}: {source}", .path.display())]
    ConfigFile {
        /// The file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A flag schema entry is invalid.
    #[error("invalid schema for flag '{name}': {message}")]
    Schema {
        /// The flag the schema entry describes.
        name: String,
        /// A description of the problem.
        message: String,
    },
}

struct JoinedErrors<'a>(&'a [Error]);

impl fmt::Display for JoinedErrors<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl Error {
    /// Builds a [`Error::TypeMismatch`] for a flag of the given kind.
    pub(crate) fn mismatch(name: &str, expected: &str, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            name: name.to_string(),
            expected: expected.to_string(),
            found: found.into(),
        }
    }

    /// Builds a [`Error::TypeMismatch`] when the supplied kind is wrong.
    pub(crate) fn kind_mismatch(name: &str, expected: FlagKind, found: &str) -> Self {
        Self::mismatch(name, &expected.to_string(), found)
    }

    /// Check if error indicates an unregistered flag name.
    ///
    /// # Examples
    ///
    /// ```
    /// use flagstack::Error;
    ///
    /// let err = Error::UnknownFlag { name: "nope".to_string() };
    /// assert!(err.is_unknown_flag());
    /// ```
    #[must_use]
    pub fn is_unknown_flag(&self) -> bool {
        matches!(self, Self::UnknownFlag { .. })
    }

    /// Check if error is a kind or type mismatch.
    #[must_use]
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Self::TypeMismatch { .. })
    }

    /// Returns the per-key errors of a population failure, or a one-element
    /// slice containing this error otherwise.
    #[must_use]
    pub fn errors(&self) -> &[Error] {
        match self {
            Self::Populate { errors } => errors,
            other => std::slice::from_ref(other),
        }
    }
}
