//! The `Sink` trait consumed by every output stage, plus an atomic JSON write
//! helper used by the Result Writer for `summary.json`/`errors.json`/`validation.json`.

use std::fs::{self, File};
use std::io::Write as _;
use std::path::Path;

use crate::Result;

/// A destination that accepts a stream of items and can report how much it
/// has written. Implemented by the JSON-lines error log and the parquet edge
/// table writer.
pub trait Sink {
    type Item;

    fn write(&mut self, item: Self::Item) -> Result<()>;

    /// Default: write each item in turn. Override for batched writers
    /// (e.g. building a single Arrow `RecordBatch` per call).
    fn write_batch(&mut self, items: Vec<Self::Item>) -> Result<()> {
        for item in items {
            self.write(item)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()>;

    fn close(self) -> Result<()>
    where
        Self: Sized;

    fn items_written(&self) -> u64;

    /// Bytes written so far, when the sink can report it cheaply.
    fn bytes_written(&self) -> Option<u64> {
        None
    }
}

/// Serialize `value` to pretty JSON and write it to `path` atomically: write
/// to a sibling temp file in the same directory, then rename over the
/// destination. A reader (or a concurrently running window) therefore never
/// observes a partially-written `summary.json`/`errors.json`/`validation.json`.
pub fn write_json_atomic(path: &Path, value: &serde_json::Value) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;
    let tmp_name = format!(
        ".{}.tmp-{}",
        path.file_name().and_then(|n| n.to_str()).unwrap_or("out"),
        std::process::id()
    );
    let tmp_path = dir.join(tmp_name);
    {
        let mut f = File::create(&tmp_path)?;
        serde_json::to_writer_pretty(&mut f, value)?;
        f.write_all(b"\n")?;
        f.flush()?;
    }
    fs::rename(&tmp_path, path)?;
    Ok(())
}
