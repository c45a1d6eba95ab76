//! Property-based test generators using proptest.

use docadmin_core::{InputFields, Value};
use proptest::prelude::*;

/// Strategy for generating one identifier segment.
pub fn segment_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,11}").expect("Invalid regex")
}

/// Strategy for generating valid `<namespace>.<collection>` identifiers.
pub fn collection_id_strategy() -> impl Strategy<Value = String> {
    (segment_strategy(), segment_strategy()).prop_map(|(ns, coll)| format!("{ns}.{coll}"))
}

/// Strategy for generating malformed identifiers.
pub fn malformed_collection_id_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        segment_strategy(),
        segment_strategy().prop_map(|s| format!(".{s}")),
        segment_strategy().prop_map(|s| format!("{s}.")),
        (segment_strategy(), segment_strategy(), segment_strategy())
            .prop_map(|(a, b, c)| format!("{a}.{b}.{c}")),
    ]
}

/// Strategy for generating a user form submission as it arrives from a
/// browser: every value is text.
pub fn user_form_strategy() -> impl Strategy<Value = (String, i64)> {
    (
        prop::string::string_regex("[A-Za-z][A-Za-z ]{0,15}").expect("Invalid regex"),
        0i64..150,
    )
}

/// Converts a `(name, age)` pair into text form input.
pub fn user_input(name: &str, age: i64) -> InputFields {
    InputFields::new()
        .with("name", Value::Text(name.to_string()))
        .with("age", Value::Text(age.to_string()))
}
