//! Property-based tests for override resolution.

use proptest::prelude::*;
use serde_yaml::Value;

use crate::resolver::{set_typed_value_for_flag_name, set_value_for_flag_name, ExplicitOverrides};
use crate::store::FlagStore;
use crate::yaml::populate_flags_from_data;

fn int_list() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(any::<i64>(), 0..8)
}

fn string_list() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{1,8}", 0..8)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 500,
        .. ProptestConfig::default()
    })]

    // Append yields the default followed by the new elements
    #[test]
    fn append_is_default_then_value(default in int_list(), incoming in int_list()) {
        let mut store = FlagStore::new();
        let flag = store.register("ints", &default, "", &[]).unwrap();

        set_typed_value_for_flag_name(&store, "ints", &incoming, &ExplicitOverrides::new(), true)
            .unwrap();

        let mut expected = default.clone();
        expected.extend(incoming.iter().copied());
        prop_assert_eq!(flag.value().len(), default.len() + incoming.len());
        prop_assert_eq!(flag.value(), expected);
    }

    // Repeating an append gives the same result as doing it once
    #[test]
    fn append_is_idempotent(default in string_list(), incoming in string_list(), repeats in 1usize..5) {
        let mut store = FlagStore::new();
        let flag = store.register("strings", &default, "", &[]).unwrap();
        let explicit = ExplicitOverrides::new();

        set_typed_value_for_flag_name(&store, "strings", &incoming, &explicit, true).unwrap();
        let once = flag.value();
        for _ in 0..repeats {
            set_typed_value_for_flag_name(&store, "strings", &incoming, &explicit, true).unwrap();
        }
        prop_assert_eq!(flag.value(), once);
    }

    // Replace ignores the default entirely
    #[test]
    fn replace_is_value(default in int_list(), incoming in int_list()) {
        let mut store = FlagStore::new();
        let flag = store.register("ints", &default, "", &[]).unwrap();

        set_typed_value_for_flag_name(&store, "ints", &incoming, &ExplicitOverrides::new(), false)
            .unwrap();
        prop_assert_eq!(flag.value(), incoming);
    }

    // An explicit flag never changes, whatever is thrown at it
    #[test]
    fn explicit_flag_is_untouched(default in any::<u32>(), raw in "[ -~]{0,16}", append in any::<bool>()) {
        let mut store = FlagStore::new();
        let flag = store.register("port", &default, "", &[]).unwrap();
        let explicit: ExplicitOverrides = std::iter::once("port".to_string()).collect();

        set_value_for_flag_name(&store, "port", Value::String(raw), &explicit, append).unwrap();
        prop_assert_eq!(flag.value(), default);
    }

    // A scalar flag only ever takes the last document's value
    #[test]
    fn scalar_takes_last_document(values in prop::collection::vec(any::<i32>(), 1..6)) {
        let mut store = FlagStore::new();
        let flag = store.register("level", &0_i32, "", &[]).unwrap();

        for value in &values {
            populate_flags_from_data(&store, &ExplicitOverrides::new(), &format!("level: {value}\n"))
                .unwrap();
        }
        prop_assert_eq!(Some(&flag.value()), values.last());
    }
}
