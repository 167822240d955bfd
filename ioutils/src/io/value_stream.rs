//! Native binary value files.
//!
//! Layout: 4-byte magic, 1-byte format version, then the bincode encoding of
//! the [`Value`]. With `compress` the whole stream sits inside gzip. Readers
//! must be told whether the file was compressed.
//!
//! Decoding is bounded: a plain file may not decode more bytes than it holds,
//! and a compressed one no more than [`MAX_DECOMPRESSED_BYTES`]. Length
//! prefixes beyond the bound are codec errors, not allocations.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use bincode::Options;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use tracing::debug;

use crate::core::value::Value;
use crate::error::{EvalError, EvalResult};

const MAGIC: &[u8; 4] = b"IOUV";
const VERSION: u8 = 1;
/// Codec name reported in decode errors.
const CODEC: &str = "RAW";
const HEADER_LEN: u64 = 5;
/// Decode budget for gzip streams, whose inflated size is unknown up front.
pub const MAX_DECOMPRESSED_BYTES: u64 = 256 * 1024 * 1024;

/// Write `value` to `path`, replacing any existing file.
pub fn write_value_file(path: &Path, value: &Value, compress: bool) -> EvalResult<()> {
    debug!(path = %path.display(), compress, "writing value file");
    let file =
        File::create(path).map_err(|e| EvalError::io(format!("create {}", path.display()), e))?;
    let writer = BufWriter::new(file);
    let flush_err = |e| EvalError::io(format!("write {}", path.display()), e);

    if compress {
        let mut encoder = GzEncoder::new(writer, Compression::default());
        write_stream(&mut encoder, value, path)?;
        encoder.finish().and_then(|mut w| w.flush()).map_err(flush_err)
    } else {
        let mut writer = writer;
        write_stream(&mut writer, value, path)?;
        writer.flush().map_err(flush_err)
    }
}

/// Read a value previously written with [`write_value_file`].
pub fn read_value_file(path: &Path, compress: bool) -> EvalResult<Value> {
    debug!(path = %path.display(), compress, "reading value file");
    let file =
        File::open(path).map_err(|e| EvalError::io(format!("open {}", path.display()), e))?;
    let len = file
        .metadata()
        .map_err(|e| EvalError::io(format!("stat {}", path.display()), e))?
        .len();
    let reader = BufReader::new(file);
    if compress {
        read_stream(GzDecoder::new(reader), path, MAX_DECOMPRESSED_BYTES)
    } else {
        read_stream(reader, path, len.saturating_sub(HEADER_LEN))
    }
}

fn write_stream<W: Write>(writer: &mut W, value: &Value, path: &Path) -> EvalResult<()> {
    writer
        .write_all(MAGIC)
        .and_then(|()| writer.write_all(&[VERSION]))
        .map_err(|e| EvalError::io(format!("write {}", path.display()), e))?;
    bincode::serialize_into(writer, value).map_err(|e| EvalError::codec(CODEC, e))
}

fn read_stream<R: Read>(mut reader: R, path: &Path, limit: u64) -> EvalResult<Value> {
    let mut header = [0u8; HEADER_LEN as usize];
    reader
        .read_exact(&mut header)
        .map_err(|e| EvalError::io(format!("read header of {}", path.display()), e))?;
    if &header[..4] != MAGIC {
        return Err(EvalError::codec(
            CODEC,
            format!("{} is not a value file", path.display()),
        ));
    }
    if header[4] != VERSION {
        return Err(EvalError::codec(
            CODEC,
            format!(
                "{} has unsupported format version {}",
                path.display(),
                header[4]
            ),
        ));
    }
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .allow_trailing_bytes()
        .with_limit(limit)
        .deserialize_from(reader)
        .map_err(|e| EvalError::codec(CODEC, e))
}
