//! JSON text backend.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use tracing::debug;

use crate::core::value::{Record, Value};
use crate::error::{EvalError, EvalResult};

use super::{SerializerBackend, optional_bool_option};

/// Writes values as plain JSON: tuples become arrays, records objects.
///
/// Option `pretty: Bool` (default `FALSE`) selects indented output. Reading
/// rejects documents with no value counterpart (`null`, floats).
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl JsonSerializer {
    pub const TYPE: &'static str = "JSON";
}

impl SerializerBackend for JsonSerializer {
    fn type_name(&self) -> &str {
        Self::TYPE
    }

    fn serialize(&self, value: &Value, path: &Path, options: &Record) -> EvalResult<()> {
        let pretty = optional_bool_option(Self::TYPE, options, "pretty")?.unwrap_or(false);
        debug!(path = %path.display(), pretty, "writing json value");
        let write_err = |e| EvalError::io(format!("write {}", path.display()), e);

        let file = File::create(path)
            .map_err(|e| EvalError::io(format!("create {}", path.display()), e))?;
        let mut writer = BufWriter::new(file);
        let json = value.to_json();
        let encoded = if pretty {
            serde_json::to_writer_pretty(&mut writer, &json)
        } else {
            serde_json::to_writer(&mut writer, &json)
        };
        encoded.map_err(|e| EvalError::codec(Self::TYPE, e))?;
        writer.write_all(b"\n").map_err(write_err)?;
        writer.flush().map_err(write_err)
    }

    fn deserialize(&self, path: &Path, _options: &Record) -> EvalResult<Value> {
        debug!(path = %path.display(), "reading json value");
        let file =
            File::open(path).map_err(|e| EvalError::io(format!("open {}", path.display()), e))?;
        let json: serde_json::Value = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| EvalError::codec(Self::TYPE, e))?;
        Value::from_json(&json).map_err(|e| EvalError::codec(Self::TYPE, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_value;

    #[test]
    fn round_trips_compact_and_pretty() {
        let temp = tempfile::tempdir().expect("tempdir");
        for pretty in [false, true] {
            let path = temp.path().join(format!("value-{pretty}.json"));
            let options = Record::from([("pretty".to_string(), Value::Bool(pretty))]);
            JsonSerializer
                .serialize(&sample_value(), &path, &options)
                .expect("serialize");
            let loaded = JsonSerializer
                .deserialize(&path, &options)
                .expect("deserialize");
            assert_eq!(loaded, sample_value());
        }
    }

    #[test]
    fn writes_plain_json_with_trailing_newline() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("value.json");
        let value = Value::record([("a", Value::tuple([Value::Int(1), Value::Bool(true)]))]);
        JsonSerializer
            .serialize(&value, &path, &Record::new())
            .expect("serialize");
        let contents = std::fs::read_to_string(&path).expect("read");
        assert_eq!(contents, "{\"a\":[1,true]}\n");
    }

    #[test]
    fn rejects_documents_without_value_counterpart() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("float.json");
        std::fs::write(&path, "{\"x\": 1.5}").expect("write");
        let err = JsonSerializer
            .deserialize(&path, &Record::new())
            .expect_err("float");
        assert!(matches!(err, EvalError::Codec { .. }));
    }
}
