//! Default backend: the native binary value file.

use std::path::Path;

use crate::core::value::{Record, Value};
use crate::error::EvalResult;
use crate::io::value_stream::{read_value_file, write_value_file};

use super::{SerializerBackend, bool_option};

/// Writes the native value stream. Requires option `compress: Bool`, which
/// must match between writing and reading.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawSerializer;

impl RawSerializer {
    pub const TYPE: &'static str = "RAW";
}

impl SerializerBackend for RawSerializer {
    fn type_name(&self) -> &str {
        Self::TYPE
    }

    fn serialize(&self, value: &Value, path: &Path, options: &Record) -> EvalResult<()> {
        let compress = bool_option(Self::TYPE, options, "compress")?;
        write_value_file(path, value, compress)
    }

    fn deserialize(&self, path: &Path, options: &Record) -> EvalResult<Value> {
        let compress = bool_option(Self::TYPE, options, "compress")?;
        read_value_file(path, compress)
    }
}
