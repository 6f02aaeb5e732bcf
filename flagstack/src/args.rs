//! Command-line flag parsing.
//!
//! Command-line values are the highest-precedence source. Every flag set here
//! is recorded in [`ParsedArgs::explicit`] so that later configuration
//! documents leave it alone.
//!
//! Accepted forms are `--name=value`, `-name=value` and `--name value`. A
//! bare `--name` sets a boolean flag to `true`. `--` ends flag parsing.
//!
//! Repeated scalar flags keep the last value. Repeated list flags
//! concatenate, and the result replaces the default.

use crate::error::{Error, Result};
use crate::resolver::ExplicitOverrides;
use crate::store::{FlagStore, DEPRECATED_TAG};

/// Outcome of a command-line pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArgs {
    /// Flags set on the command line.
    pub explicit: ExplicitOverrides,
    /// Arguments that are not flags, in order.
    pub positional: Vec<String>,
}

/// Parses `args` against the flags registered in `store` and applies them.
///
/// All values are parsed, and every target flag checked for an outstanding
/// borrow, before any flag is updated. A failure leaves every flag untouched.
///
/// # Errors
///
/// - [`Error::UnknownFlag`] for a flag that is not registered
/// - [`Error::MissingArgumentValue`] for a non-boolean flag with no value
/// - [`Error::InvalidArgument`] for a value that does not parse
/// - [`Error::FlagBorrowed`] if a target flag is borrowed through its handle
///
/// # Examples
///
/// ```
/// use flagstack::{parse_flag_args, FlagStore};
///
/// let mut store = FlagStore::new();
/// let port = store.register("port", &80_u32, "", &[]).unwrap();
/// let verbose = store.register("verbose", &false, "", &[]).unwrap();
///
/// let parsed = parse_flag_args(&store, ["--port=8080", "--verbose", "serve"]).unwrap();
/// assert_eq!(port.value(), 8080);
/// assert!(verbose.value());
/// assert!(parsed.explicit.contains("port"));
/// assert_eq!(parsed.positional, vec!["serve".to_string()]);
/// ```
pub fn parse_flag_args<I, S>(store: &FlagStore, args: I) -> Result<ParsedArgs>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut parsed = ParsedArgs::default();
    // (name, raw values) in order of first appearance
    let mut occurrences: Vec<(String, Vec<String>)> = Vec::new();
    let mut args = args.into_iter().map(Into::<String>::into);

    while let Some(arg) = args.next() {
        if arg == "--" {
            parsed.positional.extend(args.by_ref());
            break;
        }
        let Some(body) = flag_body(&arg) else {
            parsed.positional.push(arg);
            continue;
        };

        let (name, inline) = match body.split_once('=') {
            Some((name, value)) => (name.to_string(), Some(value.to_string())),
            None => (body.to_string(), None),
        };
        let flag = store.lookup(&name)?;
        let raw = match inline {
            Some(value) => value,
            None if flag.is_bool() => "true".to_string(),
            None => args
                .next()
                .ok_or_else(|| Error::MissingArgumentValue { name: name.clone() })?,
        };

        match occurrences.iter_mut().find(|(seen, _)| *seen == name) {
            Some((_, raws)) => raws.push(raw),
            None => occurrences.push((name, vec![raw])),
        }
    }

    let mut staged = Vec::with_capacity(occurrences.len());
    for (name, raws) in occurrences {
        let flag = store.lookup(&name)?;
        let value = flag.cell.parse_args(&raws)?;
        staged.push((flag, value));
    }
    if let Some((flag, _)) = staged.iter().find(|(flag, _)| flag.cell.is_borrowed()) {
        return Err(Error::FlagBorrowed {
            name: flag.name().to_string(),
        });
    }

    for (flag, value) in staged {
        flag.cell.commit_args(value)?;
        if flag.has_tag(DEPRECATED_TAG) {
            log::warn!("flag {} is deprecated: {}", flag.name(), flag.usage());
        }
        log::debug!("flag {} set on the command line", flag.name());
        parsed.explicit.insert(flag.name().to_string());
    }

    Ok(parsed)
}

/// Strips the leading dashes of a flag argument.
fn flag_body(arg: &str) -> Option<&str> {
    arg.strip_prefix("--")
        .or_else(|| arg.strip_prefix('-'))
        .filter(|body| !body.is_empty() && !body.starts_with('-') && !body.starts_with('='))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_yaml::Mapping;

    fn store_with_flags() -> FlagStore {
        let mut store = FlagStore::new();
        store.register("port", &80_u32, "", &[]).unwrap();
        store.register("verbose", &false, "", &[]).unwrap();
        store
            .register("hosts", &vec!["default".to_string()], "", &[])
            .unwrap();
        store
            .register("backends", &Vec::<Mapping>::new(), "", &[])
            .unwrap();
        store
    }

    #[test]
    fn test_flag_body() {
        assert_eq!(flag_body("--port=1"), Some("port=1"));
        assert_eq!(flag_body("-port"), Some("port"));
        assert_eq!(flag_body("-"), None);
        assert_eq!(flag_body("--"), None);
        assert_eq!(flag_body("---port"), None);
        assert_eq!(flag_body("serve"), None);
    }

    #[test]
    fn test_inline_and_separate_values() {
        let store = store_with_flags();
        parse_flag_args(&store, ["--port", "9000"]).unwrap();
        assert_eq!(store.handle::<u32>("port").unwrap().value(), 9000);

        parse_flag_args(&store, ["-port=9001"]).unwrap();
        assert_eq!(store.handle::<u32>("port").unwrap().value(), 9001);
    }

    #[test]
    fn test_bool_forms() {
        let store = store_with_flags();
        let verbose = store.handle::<bool>("verbose").unwrap();

        parse_flag_args(&store, ["--verbose"]).unwrap();
        assert!(verbose.value());

        parse_flag_args(&store, ["--verbose=false"]).unwrap();
        assert!(!verbose.value());
    }

    #[test]
    fn test_last_scalar_wins() {
        let store = store_with_flags();
        parse_flag_args(&store, ["--port=1", "--port=2"]).unwrap();
        assert_eq!(store.handle::<u32>("port").unwrap().value(), 2);
    }

    #[test]
    fn test_list_occurrences_concatenate_and_replace_default() {
        let store = store_with_flags();
        let parsed = parse_flag_args(&store, ["--hosts=a,b", "--hosts", "c"]).unwrap();

        let hosts = store.handle::<Vec<String>>("hosts").unwrap();
        assert_eq!(hosts.value(), vec!["a", "b", "c"]);
        assert!(parsed.explicit.contains("hosts"));
    }

    #[test]
    fn test_struct_sequence_from_inline_yaml() {
        let store = store_with_flags();
        parse_flag_args(
            &store,
            ["--backends={host: a, weight: 1}", r#"--backends=[{"host": "b"}]"#],
        )
        .unwrap();

        let backends = store.handle::<Vec<Mapping>>("backends").unwrap().value();
        assert_eq!(backends.len(), 2);
        assert_eq!(backends[1].get("host"), Some(&serde_yaml::Value::from("b")));
    }

    #[test]
    fn test_positionals_and_terminator() {
        let store = store_with_flags();
        let parsed = parse_flag_args(&store, ["serve", "--port=1", "--", "--verbose"]).unwrap();
        assert_eq!(parsed.positional, vec!["serve", "--verbose"]);
        assert!(!store.handle::<bool>("verbose").unwrap().value());
        assert_eq!(parsed.explicit.len(), 1);
    }

    #[test]
    fn test_unknown_flag() {
        let store = store_with_flags();
        let err = parse_flag_args(&store, ["--nope=1"]).unwrap_err();
        assert!(err.is_unknown_flag());
    }

    #[test]
    fn test_missing_value() {
        let store = store_with_flags();
        let err = parse_flag_args(&store, ["--port"]).unwrap_err();
        assert!(matches!(err, Error::MissingArgumentValue { ref name } if name == "port"));
    }

    #[test]
    fn test_bad_value_leaves_every_flag_untouched() {
        let store = store_with_flags();
        let err = parse_flag_args(&store, ["--hosts=x", "--port=eighty"]).unwrap_err();

        assert!(matches!(err, Error::InvalidArgument { ref value, .. } if value == "eighty"));
        assert_eq!(
            store.handle::<Vec<String>>("hosts").unwrap().value(),
            vec!["default"]
        );
        assert_eq!(store.handle::<u32>("port").unwrap().value(), 80);
    }

    #[test]
    fn test_borrowed_flag_leaves_every_flag_untouched() {
        let store = store_with_flags();
        let port = store.handle::<u32>("port").unwrap();
        let guard = port.get();

        let err = parse_flag_args(&store, ["--hosts=x", "--port=81"]).unwrap_err();
        assert!(matches!(err, Error::FlagBorrowed { ref name } if name == "port"));
        drop(guard);

        assert_eq!(
            store.handle::<Vec<String>>("hosts").unwrap().value(),
            vec!["default"]
        );
        assert_eq!(port.value(), 80);
    }
}
