//! Test-only helpers for building values and operator contexts.

use crate::core::value::{Record, Value};
use crate::io::env::EnvSnapshot;
use crate::io::serializer::SerializerRegistry;
use crate::operators::IoUtils;

/// Tuple of string values.
pub fn strs(items: &[&str]) -> Value {
    Value::tuple(items.iter().copied())
}

/// A value that exercises every variant, including nesting and empty
/// containers.
pub fn sample_value() -> Value {
    Value::record([
        ("flag", Value::Bool(true)),
        ("count", Value::Int(-42)),
        ("big", Value::Int(i64::MAX)),
        ("name", Value::string("quote \" and \u{e9}")),
        ("empty_tuple", Value::Tuple(Vec::new())),
        ("empty_record", Value::Record(Record::new())),
        (
            "nested",
            Value::tuple([
                strs(&["a", "b"]),
                Value::record([("inner", Value::Bool(false))]),
            ]),
        ),
    ])
}

/// Operator context with every builtin backend, the current environment, and
/// no exec timeout.
pub fn context() -> IoUtils {
    IoUtils::from_parts(
        EnvSnapshot::capture(),
        SerializerRegistry::with_builtins(),
        None,
    )
}
