//! Resolves a `(company, start, end)` window to its Event rows by walking
//! the hive-partitioned event store and filtering by timestamp.

use std::path::{Path, PathBuf};

use arrow::array::{Int64Array, StringArray, TimestampNanosecondArray};
use arrow::datatypes::DataType;
use chrono::NaiveDate;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use rtinfluence_core::timebin::{month_iter, normalize_window_end};
use rtinfluence_core::{Error, Event, Result};

/// Column names the event store is read through; defaults are `src`/`dst`/`ts`
/// but are configurable per the external interface.
#[derive(Debug, Clone)]
pub struct ColumnNames {
    pub src: String,
    pub dst: String,
    pub timestamp: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            src: "src".to_string(),
            dst: "dst".to_string(),
            timestamp: "ts".to_string(),
        }
    }
}

/// Load every event for `company` whose timestamp falls in `[start_ns, end_ns]`
/// after end-of-day normalization. Missing partitions are not an error: a
/// company/month directory that doesn't exist simply contributes no rows.
pub fn load_window(
    root: &Path,
    company: &str,
    start_ns: i64,
    end_ns: i64,
    columns: &ColumnNames,
) -> Result<Vec<Event>> {
    let end_ns = normalize_window_end(end_ns);
    let start_date = nanos_to_date(start_ns)?;
    let end_date = nanos_to_date(end_ns)?;

    let mut events = Vec::new();
    for month in month_iter(start_date, end_date) {
        let dir = root
            .join(format!("company={company}"))
            .join(format!("year={}", month.format("%Y")))
            .join(format!("month={}", month.format("%-m")));
        if !dir.is_dir() {
            continue;
        }
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("parquet") {
                continue;
            }
            events.extend(read_parquet_file(&path, company, start_ns, end_ns, columns)?);
        }
    }
    Ok(events)
}

fn nanos_to_date(ns: i64) -> Result<NaiveDate> {
    let secs = ns.div_euclid(1_000_000_000);
    chrono::DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.date_naive())
        .ok_or_else(|| Error::config(format!("timestamp {ns} out of range")))
}

fn read_parquet_file(
    path: &PathBuf,
    company: &str,
    start_ns: i64,
    end_ns: i64,
    columns: &ColumnNames,
) -> Result<Vec<Event>> {
    let file = std::fs::File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let reader = builder.build()?;

    let mut out = Vec::new();
    for batch in reader {
        let batch = batch?;
        let src_idx = batch
            .schema()
            .index_of(&columns.src)
            .map_err(|e| Error::io_data(format!("missing column '{}': {e}", columns.src)))?;
        let dst_idx = batch
            .schema()
            .index_of(&columns.dst)
            .map_err(|e| Error::io_data(format!("missing column '{}': {e}", columns.dst)))?;
        let ts_idx = batch
            .schema()
            .index_of(&columns.timestamp)
            .map_err(|e| Error::io_data(format!("missing column '{}': {e}", columns.timestamp)))?;

        let src_col = batch.column(src_idx);
        let dst_col = batch.column(dst_idx);
        let ts_col = batch.column(ts_idx);

        let src_arr = src_col
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| Error::io_data(format!("column '{}' is not a string array", columns.src)))?;
        let dst_arr = dst_col
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| Error::io_data(format!("column '{}' is not a string array", columns.dst)))?;
        let ts_values: Vec<i64> = match ts_col.data_type() {
            DataType::Timestamp(_, _) => {
                let arr = ts_col
                    .as_any()
                    .downcast_ref::<TimestampNanosecondArray>()
                    .ok_or_else(|| Error::io_data(format!("column '{}' has unsupported timestamp unit", columns.timestamp)))?;
                arr.values().iter().copied().collect()
            }
            DataType::Int64 => {
                let arr = ts_col
                    .as_any()
                    .downcast_ref::<Int64Array>()
                    .ok_or_else(|| Error::io_data(format!("column '{}' is not int64", columns.timestamp)))?;
                arr.values().iter().copied().collect()
            }
            other => {
                return Err(Error::io_data(format!(
                    "column '{}' has unsupported type {other:?}",
                    columns.timestamp
                )))
            }
        };

        for row in 0..batch.num_rows() {
            let ts = ts_values[row];
            if ts < start_ns || ts > end_ns {
                continue;
            }
            out.push(Event {
                company: company.to_string(),
                src: src_arr.value(row).to_string(),
                dst: dst_arr.value(row).to_string(),
                ts,
            });
        }
    }
    Ok(out)
}
