//! Deterministic time binning for the Diffusion Analyzer.
//!
//! Bin edges are always anchored to the window's own minimum event timestamp,
//! never to the Unix epoch, so that two windows with the same relative event
//! timing bin identically regardless of absolute calendar date.

use chrono::{Datelike, NaiveDate, NaiveDateTime};

use crate::{Error, Result};

/// A parsed `diff_bin` duration, expressed in whole seconds.
///
/// Accepts the `<N><unit>` forms named in the external interfaces: `min`,
/// `h`, `d` (e.g. `"10min"`, `"5h"`, `"1d"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinDuration {
    pub seconds: i64,
}

impl BinDuration {
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let split_at = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| Error::config(format!("invalid diff_bin '{s}': no unit suffix")))?;
        let (num, unit) = s.split_at(split_at);
        let n: i64 = num
            .parse()
            .map_err(|_| Error::config(format!("invalid diff_bin '{s}': non-numeric magnitude")))?;
        if n <= 0 {
            return Err(Error::config(format!("invalid diff_bin '{s}': magnitude must be positive")));
        }
        let seconds = match unit {
            "min" => n * 60,
            "h" => n * 3600,
            "d" => n * 86400,
            other => {
                return Err(Error::config(format!(
                    "invalid diff_bin '{s}': unknown unit '{other}' (expected min/h/d)"
                )))
            }
        };
        Ok(Self { seconds })
    }
}

/// Floor `ts` (nanoseconds since epoch) to the bin grid anchored at `t0`
/// (also nanoseconds since epoch): `t0 + floor((ts - t0) / bin) * bin`.
///
/// Bin width is given in seconds; the result is nanoseconds since epoch.
pub fn floor_to_bin(ts_ns: i64, t0_ns: i64, bin: BinDuration) -> i64 {
    let bin_ns = bin.seconds * 1_000_000_000;
    if bin_ns <= 0 {
        return ts_ns;
    }
    let delta = ts_ns - t0_ns;
    let floored = delta.div_euclid(bin_ns) * bin_ns;
    t0_ns + floored
}

/// The minimum timestamp in a window's event set, the anchor for `floor_to_bin`.
pub fn window_anchor(timestamps: &[i64]) -> Option<i64> {
    timestamps.iter().copied().min()
}

/// Normalize a window's end-of-day boundary: given a calendar date string
/// (`YYYY-MM-DD`), return the nanosecond timestamp of `23:59:59.999999999`
/// on that date, matching schedule rows that specify end dates without a
/// time-of-day component.
pub fn normalize_end_of_day(date: &str) -> Result<i64> {
    let d = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|e| Error::config(format!("invalid end date '{date}': {e}")))?;
    let dt = d
        .and_hms_nano_opt(23, 59, 59, 999_999_999)
        .ok_or_else(|| Error::config(format!("invalid end date '{date}'")))?;
    Ok(dt.and_utc().timestamp_nanos_opt().unwrap_or(i64::MAX))
}

const NANOS_PER_DAY: i64 = 86_400 * 1_000_000_000;
const ONE_MICRO_NS: i64 = 1_000;

/// Normalize a window's `end` boundary: if `end_ns` falls exactly at midnight,
/// extend it to the last microsecond of that day (`end + 1 day - 1us`);
/// otherwise return it unchanged. A window loader compares events against
/// this normalized bound, not the raw schedule value.
pub fn normalize_window_end(end_ns: i64) -> i64 {
    if end_ns.rem_euclid(NANOS_PER_DAY) == 0 {
        end_ns + NANOS_PER_DAY - ONE_MICRO_NS
    } else {
        end_ns
    }
}

/// Parse a full `YYYY-MM-DD HH:MM:SS` timestamp string into nanoseconds since
/// the Unix epoch, as used for window schedule `start`/`end` columns that do
/// carry a time-of-day component.
pub fn parse_timestamp(s: &str) -> Result<i64> {
    let s = s.trim();
    let dt = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map_err(|e| Error::config(format!("invalid timestamp '{s}': {e}")))?;
    Ok(dt.and_utc().timestamp_nanos_opt().unwrap_or(i64::MAX))
}

/// Iterate the first-of-month dates (`YYYY-MM-01`) from `start` through `end`
/// inclusive, used to walk hive `month=` partitions covering a window.
pub fn month_iter(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut out = Vec::new();
    let mut cur = NaiveDate::from_ymd_opt(start.year(), start.month(), 1).unwrap();
    let last = NaiveDate::from_ymd_opt(end.year(), end.month(), 1).unwrap();
    while cur <= last {
        out.push(cur);
        cur = if cur.month() == 12 {
            NaiveDate::from_ymd_opt(cur.year() + 1, 1, 1).unwrap()
        } else {
            NaiveDate::from_ymd_opt(cur.year(), cur.month() + 1, 1).unwrap()
        };
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bin_duration_parses_minutes_hours_days() {
        assert_eq!(BinDuration::parse("10min").unwrap().seconds, 600);
        assert_eq!(BinDuration::parse("5h").unwrap().seconds, 5 * 3600);
        assert_eq!(BinDuration::parse("1d").unwrap().seconds, 86400);
        assert!(BinDuration::parse("10x").is_err());
        assert!(BinDuration::parse("0min").is_err());
    }

    #[test]
    fn floor_to_bin_anchors_at_t0_not_epoch() {
        let bin = BinDuration::parse("10min").unwrap();
        let t0 = 1_000_000_000_000_000_000i64;
        let ts = t0 + 15 * 60 * 1_000_000_000;
        let floored = floor_to_bin(ts, t0, bin);
        assert_eq!(floored, t0 + 10 * 60 * 1_000_000_000);
    }

    #[test]
    fn floor_to_bin_is_identity_at_anchor() {
        let bin = BinDuration::parse("1d").unwrap();
        let t0 = 123_456_789_000_000_000i64;
        assert_eq!(floor_to_bin(t0, t0, bin), t0);
    }

    #[test]
    fn month_iter_spans_year_boundary() {
        let start = NaiveDate::from_ymd_opt(2017, 11, 15).unwrap();
        let end = NaiveDate::from_ymd_opt(2018, 1, 3).unwrap();
        let months = month_iter(start, end);
        assert_eq!(months.len(), 3);
        assert_eq!(months[0], NaiveDate::from_ymd_opt(2017, 11, 1).unwrap());
        assert_eq!(months[2], NaiveDate::from_ymd_opt(2018, 1, 1).unwrap());
    }

    #[test]
    fn normalize_end_of_day_is_last_nanosecond() {
        let ns = normalize_end_of_day("2017-06-30").unwrap();
        let expected = parse_timestamp("2017-06-30 23:59:59").unwrap() + 999_999_999;
        assert_eq!(ns, expected);
    }

    #[test]
    fn normalize_window_end_extends_exact_midnight() {
        let midnight = parse_timestamp("2017-06-30 00:00:00").unwrap();
        let normalized = normalize_window_end(midnight);
        assert_eq!(normalized, midnight + NANOS_PER_DAY - ONE_MICRO_NS);
    }

    #[test]
    fn normalize_window_end_leaves_non_midnight_unchanged() {
        let ts = parse_timestamp("2017-06-30 12:00:00").unwrap();
        assert_eq!(normalize_window_end(ts), ts);
    }
}
