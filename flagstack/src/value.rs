//! Flag value kinds and the types that can back a flag.
//!
//! Every flag is backed by a Rust type implementing [`FlagType`]. The type
//! fixes the flag's [`FlagKind`] at registration:
//!
//! - scalars (`bool`, integers, floats, `String`, `PathBuf`, `Url`) and single
//!   records are [`FlagKind::Scalar`]
//! - `Vec` of scalars is [`FlagKind::Sequence`]
//! - `Vec` of records is [`FlagKind::StructSequence`]
//!
//! Records are any serde struct opted in with [`record_flag_type!`].
//!
//! # Examples
//!
//! ```
//! use flagstack::{FlagKind, FlagType};
//!
//! assert_eq!(<u64 as FlagType>::KIND, FlagKind::Scalar);
//! assert_eq!(<Vec<String> as FlagType>::KIND, FlagKind::Sequence);
//! assert_eq!(<Vec<serde_yaml::Mapping> as FlagType>::KIND, FlagKind::StructSequence);
//! ```

use std::fmt;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_yaml::Value;

/// The shape of a flag's value, fixed when the flag is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlagKind {
    /// A single value, replaced wholesale on every override.
    Scalar,
    /// An ordered list of scalars.
    Sequence,
    /// An ordered list of field-keyed records.
    StructSequence,
}

impl fmt::Display for FlagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar => write!(f, "scalar"),
            Self::Sequence => write!(f, "sequence"),
            Self::StructSequence => write!(f, "struct sequence"),
        }
    }
}

impl FlagKind {
    /// Returns true for the two list kinds.
    #[must_use]
    pub const fn is_sequence(self) -> bool {
        matches!(self, Self::Sequence | Self::StructSequence)
    }

    /// Checks whether a raw configuration value has the shape of this kind.
    ///
    /// An empty list is accepted by both list kinds.
    ///
    /// # Examples
    ///
    /// ```
    /// use flagstack::FlagKind;
    ///
    /// let list: serde_yaml::Value = serde_yaml::from_str("[1, 2]").unwrap();
    /// assert!(FlagKind::Sequence.accepts(&list));
    /// assert!(!FlagKind::Scalar.accepts(&list));
    /// assert!(!FlagKind::StructSequence.accepts(&list));
    /// ```
    #[must_use]
    pub fn accepts(self, value: &Value) -> bool {
        match (self, value) {
            (Self::Scalar, Value::Sequence(_)) => false,
            (Self::Scalar, _) => true,
            (Self::Sequence, Value::Sequence(items)) => !items.iter().any(Value::is_mapping),
            (Self::StructSequence, Value::Sequence(items)) => items.iter().all(Value::is_mapping),
            _ => false,
        }
    }
}

/// Describes a raw value for error messages.
pub(crate) fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(items) if items.is_empty() => "empty sequence",
        Value::Sequence(items) if items.iter().all(Value::is_mapping) => "struct sequence",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

/// A Rust type that can back a flag.
///
/// Implementations must own their data: registration deep-copies the caller's
/// default through [`Clone`], so a type holding shared references would let
/// the stored default alias the caller's variable.
pub trait FlagType: Clone + fmt::Debug + Serialize + DeserializeOwned + 'static {
    /// The flag kind this type registers as.
    const KIND: FlagKind;

    /// Whether a bare `--name` on the command line means `true`.
    const IS_BOOL: bool = false;

    /// Name shown in usage text and type mismatch errors.
    fn type_name() -> &'static str;

    /// Combines two values of a list kind, `self` first.
    ///
    /// For scalars the tail simply replaces `self`.
    #[must_use]
    fn concat(self, tail: Self) -> Self {
        tail
    }

    /// Parses one command-line occurrence of the flag.
    ///
    /// # Errors
    ///
    /// Returns a description of the parse failure.
    fn parse_arg(raw: &str) -> Result<Self, String>;
}

/// A type that can be an element of a list-valued flag.
pub trait FlagElement: Clone + fmt::Debug + Serialize + DeserializeOwned + 'static {
    /// Kind of a `Vec` of this element.
    const SEQUENCE_KIND: FlagKind;

    /// Name of a `Vec` of this element, e.g. `[]string`.
    fn list_type_name() -> &'static str;

    /// Parses one command-line occurrence into zero or more elements.
    ///
    /// # Errors
    ///
    /// Returns a description of the parse failure.
    fn parse_elements(raw: &str) -> Result<Vec<Self>, String>;
}

impl<E: FlagElement> FlagType for Vec<E> {
    const KIND: FlagKind = E::SEQUENCE_KIND;

    fn type_name() -> &'static str {
        E::list_type_name()
    }

    fn concat(mut self, tail: Self) -> Self {
        self.extend(tail);
        self
    }

    fn parse_arg(raw: &str) -> Result<Self, String> {
        E::parse_elements(raw)
    }
}

/// Splits a comma-separated command-line value into parsed elements.
fn parse_comma_separated<T>(
    raw: &str,
    parse: impl Fn(&str) -> Result<T, String>,
) -> Result<Vec<T>, String> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    raw.split(',').map(|part| parse(part.trim())).collect()
}

macro_rules! scalar_flag_type {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl FlagType for $ty {
                const KIND: FlagKind = FlagKind::Scalar;

                fn type_name() -> &'static str {
                    $name
                }

                fn parse_arg(raw: &str) -> Result<Self, String> {
                    raw.parse::<$ty>().map_err(|e| e.to_string())
                }
            }

            impl FlagElement for $ty {
                const SEQUENCE_KIND: FlagKind = FlagKind::Sequence;

                fn list_type_name() -> &'static str {
                    concat!("[]", $name)
                }

                fn parse_elements(raw: &str) -> Result<Vec<Self>, String> {
                    parse_comma_separated(raw, <$ty as FlagType>::parse_arg)
                }
            }
        )*
    };
}

scalar_flag_type! {
    i32 => "int32",
    i64 => "int64",
    u32 => "uint32",
    u64 => "uint64",
    usize => "uint",
    f64 => "float64",
    String => "string",
    PathBuf => "path",
    url::Url => "url",
}

impl FlagType for bool {
    const KIND: FlagKind = FlagKind::Scalar;
    const IS_BOOL: bool = true;

    fn type_name() -> &'static str {
        "bool"
    }

    fn parse_arg(raw: &str) -> Result<Self, String> {
        match raw {
            "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
            "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
            _ => Err(format!("invalid boolean '{raw}'")),
        }
    }
}

impl FlagElement for bool {
    const SEQUENCE_KIND: FlagKind = FlagKind::Sequence;

    fn list_type_name() -> &'static str {
        "[]bool"
    }

    fn parse_elements(raw: &str) -> Result<Vec<Self>, String> {
        parse_comma_separated(raw, <bool as FlagType>::parse_arg)
    }
}

/// Parses a single record from inline YAML or JSON.
///
/// # Errors
///
/// Returns the deserialization error as a string.
pub fn parse_record<T: DeserializeOwned>(raw: &str) -> Result<T, String> {
    serde_yaml::from_str(raw).map_err(|e| e.to_string())
}

/// Parses inline YAML or JSON holding either one record or a list of records.
///
/// # Errors
///
/// Returns the deserialization error as a string.
pub fn parse_record_list<T: DeserializeOwned>(raw: &str) -> Result<Vec<T>, String> {
    let value: Value = serde_yaml::from_str(raw).map_err(|e| e.to_string())?;
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Sequence(_) => serde_yaml::from_value(value).map_err(|e| e.to_string()),
        single => serde_yaml::from_value(single)
            .map(|record| vec![record])
            .map_err(|e| e.to_string()),
    }
}

/// Opts a serde struct in as a flag record.
///
/// The struct becomes usable both as a scalar flag and as the element of a
/// struct-sequence flag (`Vec<T>`). Command-line values are inline YAML or
/// JSON mappings.
///
/// # Examples
///
/// ```
/// use flagstack::{record_flag_type, FlagKind, FlagType};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// struct Backend {
///     host: String,
///     weight: u32,
/// }
///
/// record_flag_type!(Backend);
///
/// assert_eq!(<Backend as FlagType>::KIND, FlagKind::Scalar);
/// assert_eq!(<Vec<Backend> as FlagType>::KIND, FlagKind::StructSequence);
/// assert_eq!(<Vec<Backend> as FlagType>::type_name(), "[]Backend");
/// ```
#[macro_export]
macro_rules! record_flag_type {
    (@impls $ty:ty, [$($name:tt)*]) => {
        impl $crate::FlagType for $ty {
            const KIND: $crate::FlagKind = $crate::FlagKind::Scalar;

            fn type_name() -> &'static str {
                $($name)*
            }

            fn parse_arg(raw: &str) -> ::std::result::Result<Self, ::std::string::String> {
                $crate::value::parse_record(raw)
            }
        }

        impl $crate::FlagElement for $ty {
            const SEQUENCE_KIND: $crate::FlagKind = $crate::FlagKind::StructSequence;

            fn list_type_name() -> &'static str {
                concat!("[]", $($name)*)
            }

            fn parse_elements(
                raw: &str,
            ) -> ::std::result::Result<::std::vec::Vec<Self>, ::std::string::String> {
                $crate::value::parse_record_list(raw)
            }
        }
    };
    ($ty:ty, $name:literal) => {
        $crate::record_flag_type!(@impls $ty, [$name]);
    };
    ($ty:ty) => {
        $crate::record_flag_type!(@impls $ty, [stringify!($ty)]);
    };
}

record_flag_type!(serde_yaml::Mapping, "record");

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(FlagKind::Scalar.to_string(), "scalar");
        assert_eq!(FlagKind::Sequence.to_string(), "sequence");
        assert_eq!(FlagKind::StructSequence.to_string(), "struct sequence");
    }

    #[test]
    fn test_kinds_of_builtin_types() {
        assert_eq!(<bool as FlagType>::KIND, FlagKind::Scalar);
        assert_eq!(<String as FlagType>::KIND, FlagKind::Scalar);
        assert_eq!(<serde_yaml::Mapping as FlagType>::KIND, FlagKind::Scalar);
        assert_eq!(<Vec<i64> as FlagType>::KIND, FlagKind::Sequence);
        assert_eq!(<Vec<PathBuf> as FlagType>::KIND, FlagKind::Sequence);
        assert_eq!(
            <Vec<serde_yaml::Mapping> as FlagType>::KIND,
            FlagKind::StructSequence
        );
    }

    #[test]
    fn test_type_names() {
        assert_eq!(<u64 as FlagType>::type_name(), "uint64");
        assert_eq!(<Vec<String> as FlagType>::type_name(), "[]string");
        assert_eq!(<Vec<serde_yaml::Mapping> as FlagType>::type_name(), "[]record");
    }

    #[test]
    fn test_scalar_accepts() {
        assert!(FlagKind::Scalar.accepts(&yaml("true")));
        assert!(FlagKind::Scalar.accepts(&yaml("{field: 1}")));
        assert!(!FlagKind::Scalar.accepts(&yaml("[1]")));
    }

    #[test]
    fn test_sequence_accepts() {
        assert!(FlagKind::Sequence.accepts(&yaml("[a, b]")));
        assert!(FlagKind::Sequence.accepts(&yaml("[]")));
        assert!(!FlagKind::Sequence.accepts(&yaml("[{field: 1}]")));
        assert!(!FlagKind::Sequence.accepts(&yaml("a")));
    }

    #[test]
    fn test_struct_sequence_accepts() {
        assert!(FlagKind::StructSequence.accepts(&yaml("[{field: 1}, {field: 2}]")));
        assert!(FlagKind::StructSequence.accepts(&yaml("[]")));
        assert!(!FlagKind::StructSequence.accepts(&yaml("[1, 2]")));
        assert!(!FlagKind::StructSequence.accepts(&yaml("{field: 1}")));
    }

    #[test]
    fn test_describe() {
        assert_eq!(describe(&yaml("[]")), "empty sequence");
        assert_eq!(describe(&yaml("[{a: 1}]")), "struct sequence");
        assert_eq!(describe(&yaml("[1]")), "sequence");
        assert_eq!(describe(&yaml("~")), "null");
    }

    #[test]
    fn test_concat_scalar_replaces() {
        assert_eq!(2_i64.concat(5), 5);
    }

    #[test]
    fn test_concat_sequence_extends() {
        let joined = vec![1, 2].concat(vec![3]);
        assert_eq!(joined, vec![1, 2, 3]);
    }

    #[test]
    fn test_parse_bool_arg() {
        assert!(<bool as FlagType>::parse_arg("true").unwrap());
        assert!(<bool as FlagType>::parse_arg("1").unwrap());
        assert!(!<bool as FlagType>::parse_arg("F").unwrap());
        assert!(<bool as FlagType>::parse_arg("yes").is_err());
    }

    #[test]
    fn test_parse_list_arg() {
        let values = <Vec<u32> as FlagType>::parse_arg("1, 2,3").unwrap();
        assert_eq!(values, vec![1, 2, 3]);
        assert!(<Vec<u32> as FlagType>::parse_arg("1,x").is_err());
        assert!(<Vec<String> as FlagType>::parse_arg("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_record_list_single_or_many() {
        let one = <Vec<serde_yaml::Mapping> as FlagType>::parse_arg("{field: 3}").unwrap();
        assert_eq!(one.len(), 1);
        let many =
            <Vec<serde_yaml::Mapping> as FlagType>::parse_arg(r#"[{"field": 1}, {"field": 2}]"#)
                .unwrap();
        assert_eq!(many.len(), 2);
    }
}
