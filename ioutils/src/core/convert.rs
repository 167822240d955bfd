//! Argument validation and conversion shared by the operators.
//!
//! Each helper names the calling operator so a shape error points back at the
//! expression the user wrote.

use crate::core::value::{Record, Value};
use crate::error::{EvalError, EvalResult};

pub fn expect_str<'a>(operator: &'static str, value: &'a Value) -> EvalResult<&'a str> {
    value
        .as_str()
        .ok_or_else(|| EvalError::shape(operator, "string", value))
}

pub fn expect_bool(operator: &'static str, value: &Value) -> EvalResult<bool> {
    value
        .as_bool()
        .ok_or_else(|| EvalError::shape(operator, "boolean", value))
}

pub fn expect_tuple<'a>(operator: &'static str, value: &'a Value) -> EvalResult<&'a [Value]> {
    value
        .as_tuple()
        .ok_or_else(|| EvalError::shape(operator, "sequence", value))
}

pub fn expect_record<'a>(operator: &'static str, value: &'a Value) -> EvalResult<&'a Record> {
    value
        .as_record()
        .ok_or_else(|| EvalError::shape(operator, "record", value))
}

/// Convert a tuple of strings into owned command tokens.
///
/// Tokens are taken verbatim: no quoting, escaping, or trimming.
pub fn strings(operator: &'static str, value: &Value) -> EvalResult<Vec<String>> {
    expect_tuple(operator, value)?
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| EvalError::shape(operator, "sequence of strings", item))
        })
        .collect()
}

/// Convert a record of strings into environment overrides, in field order.
pub fn env_overrides(operator: &'static str, value: &Value) -> EvalResult<Vec<(String, String)>> {
    expect_record(operator, value)?
        .iter()
        .map(|(name, item)| {
            item.as_str()
                .map(|s| (name.clone(), s.to_string()))
                .ok_or_else(|| EvalError::shape(operator, "record of strings", item))
        })
        .collect()
}

/// Strict base-10 parse of a string value.
///
/// Accepts an optional leading sign; anything else (whitespace, empty input,
/// overflow) is a parse error.
pub fn parse_int(operator: &'static str, value: &Value) -> EvalResult<i64> {
    let parse_error = || EvalError::Parse {
        operator,
        expected: "string",
        value: value.to_string(),
    };
    let s = value
        .as_str()
        .ok_or_else(|| EvalError::shape(operator, "string", value))?;
    s.parse::<i64>().map_err(|_| parse_error())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_accepts_tuple_of_strings() {
        let value = Value::tuple(["echo", "hello world"]);
        assert_eq!(
            strings("IOExec", &value).expect("strings"),
            vec!["echo".to_string(), "hello world".to_string()]
        );
    }

    #[test]
    fn strings_rejects_non_string_elements() {
        let value = Value::tuple([Value::Int(1), Value::Int(2)]);
        let err = strings("IOExec", &value).expect_err("shape error");
        match err {
            EvalError::ArgumentShape {
                operator, value, ..
            } => {
                assert_eq!(operator, "IOExec");
                assert_eq!(value, "1");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn strings_rejects_non_tuple() {
        let err = strings("IOExec", &Value::string("ls")).expect_err("shape error");
        assert!(err.to_string().contains("should be a sequence"));
    }

    #[test]
    fn env_overrides_require_string_values() {
        let ok = Value::record([("FOO", "bar")]);
        assert_eq!(
            env_overrides("IOEnvExec", &ok).expect("env"),
            vec![("FOO".to_string(), "bar".to_string())]
        );

        let bad = Value::record([("FOO", Value::string("ok")), ("BAR", Value::Int(1))]);
        match env_overrides("IOEnvExec", &bad).expect_err("shape error") {
            EvalError::ArgumentShape {
                operator,
                expected,
                value,
            } => {
                assert_eq!(operator, "IOEnvExec");
                assert_eq!(expected, "record of strings");
                assert_eq!(value, "1");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(env_overrides("IOEnvExec", &Value::tuple(["FOO"])).is_err());
    }

    #[test]
    fn parse_int_is_strict() {
        assert_eq!(parse_int("atoi", &Value::string("42")).expect("int"), 42);
        assert_eq!(parse_int("atoi", &Value::string("-7")).expect("int"), -7);
        for bad in ["", "abc", " 1", "1.0", "99999999999999999999"] {
            assert!(
                matches!(
                    parse_int("atoi", &Value::string(bad)),
                    Err(EvalError::Parse { .. })
                ),
                "{bad:?} should not parse"
            );
        }
    }

    #[test]
    fn parse_int_reports_printable_value() {
        let err = parse_int("atoi", &Value::string("abc")).expect_err("parse error");
        assert_eq!(
            err.to_string(),
            "the argument of atoi should be a string, but instead it is: \"abc\""
        );
        assert!(matches!(
            parse_int("atoi", &Value::Int(4)),
            Err(EvalError::ArgumentShape { .. })
        ));
    }
}
