//! Environment snapshot captured once per operator context.

use tracing::debug;

use crate::core::value::{Record, Value};

/// Immutable record of the environment variables visible at capture time.
///
/// There is no single-variable lookup; callers read the whole record and key
/// into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvSnapshot {
    record: Value,
}

impl EnvSnapshot {
    /// Read the current process environment, in the order the OS yields it.
    ///
    /// Names or values that are not valid UTF-8 are converted lossily.
    pub fn capture() -> Self {
        let snapshot = Self::from_vars(std::env::vars_os().map(|(name, value)| {
            (
                name.to_string_lossy().into_owned(),
                value.to_string_lossy().into_owned(),
            )
        }));
        debug!(vars = snapshot.len(), "captured environment snapshot");
        snapshot
    }

    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let fields: Record = vars
            .into_iter()
            .map(|(name, value)| (name.into(), Value::String(value.into())))
            .collect();
        Self {
            record: Value::Record(fields),
        }
    }

    pub fn as_value(&self) -> &Value {
        &self.record
    }

    pub fn len(&self) -> usize {
        self.record.as_record().map_or(0, |fields| fields.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
