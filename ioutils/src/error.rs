//! Typed evaluation errors raised by the operators.

use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::core::template::FormatError;
use crate::core::value::Value;

/// Result type for operator calls.
pub type EvalResult<T> = Result<T, EvalError>;

/// Errors that abort the current evaluation step.
///
/// A missing serializer backend and a non-zero process exit are not errors;
/// both are reported as values.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("the argument of {operator} should be a {expected}, but instead it is: {value}")]
    ArgumentShape {
        operator: &'static str,
        expected: &'static str,
        value: String,
    },
    #[error("the argument of {operator} should be a {expected}, but instead it is: {value}")]
    Parse {
        operator: &'static str,
        expected: &'static str,
        value: String,
    },
    #[error("{operator}: {source}")]
    Format {
        operator: &'static str,
        #[source]
        source: FormatError,
    },
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
    #[error("{backend} codec: {message}")]
    Codec { backend: String, message: String },
    #[error("{backend} serializer requires option {key} to be a {expected}")]
    Option {
        backend: String,
        key: &'static str,
        expected: &'static str,
    },
    #[error("{command} did not exit within {timeout:?}")]
    Timeout { command: String, timeout: Duration },
    #[error("unknown operator {0}")]
    UnknownOperator(String),
    #[error("{operator} takes {expected} argument(s), got {actual}")]
    Arity {
        operator: &'static str,
        expected: usize,
        actual: usize,
    },
}

impl EvalError {
    /// Shape mismatch for `value`, reported with its printable form.
    pub fn shape(operator: &'static str, expected: &'static str, value: &Value) -> Self {
        EvalError::ArgumentShape {
            operator,
            expected,
            value: value.to_string(),
        }
    }

    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        EvalError::Io {
            context: context.into(),
            source,
        }
    }

    pub fn codec(backend: impl Into<String>, message: impl ToString) -> Self {
        EvalError::Codec {
            backend: backend.into(),
            message: message.to_string(),
        }
    }
}
